//! Platform event reactors.
//!
//! These reconcile the store with state changes observed on the platform
//! itself: actions taken by other tools, other staff clients, or the
//! platform's own moderation surface. Reactors are convergence code;
//! everything they do is idempotent, and their errors go to the log, never
//! to a user.

use anyhow::Result;
use tracing::debug;

use crate::ModerationService;
use crate::database::models::ActionKind;

/// A target was banned, by whatever means.
///
/// Open reports and requests naming them can no longer be meaningfully
/// reviewed, and any scheduled reversal for them is superseded: the ban
/// outranks a pending unmute, and a pending unban must not undo a manual
/// ban.
pub async fn on_member_banned(svc: &ModerationService, guild_id: u64, user_id: u64) -> Result<()> {
    let closed = svc.engine.auto_resolve_target(guild_id, user_id).await?;
    let dropped = svc.tasks.delete_all_for(guild_id, user_id).await?;

    debug!(
        "member {} banned in guild {}: {} entries auto-resolved, {} tasks dropped",
        user_id, guild_id, closed, dropped
    );

    Ok(())
}

/// A target was unbanned outside the sweeper.
///
/// The scheduled reversal is moot; drop it so a later tick doesn't re-lift
/// a ban that no longer exists.
pub async fn on_member_unbanned(svc: &ModerationService, guild_id: u64, user_id: u64) -> Result<()> {
    svc.tasks.delete(guild_id, user_id, ActionKind::Ban).await?;
    Ok(())
}

/// A target's communication restriction was lifted outside the sweeper.
pub async fn on_member_unmuted(svc: &ModerationService, guild_id: u64, user_id: u64) -> Result<()> {
    svc.tasks.delete(guild_id, user_id, ActionKind::Mute).await?;
    Ok(())
}

/// First contact with a guild.
///
/// Ensures the configuration record exists, so every known guild has
/// exactly one. Idempotent: re-joining an already-known guild changes
/// nothing.
pub async fn on_guild_joined(svc: &ModerationService, guild_id: u64) -> Result<()> {
    svc.config.get(guild_id).await?;
    debug!("guild {} configuration ensured", guild_id);
    Ok(())
}
