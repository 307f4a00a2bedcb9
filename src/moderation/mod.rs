//! Infraction issuance and reversal.
//!
//! The single path through which punitive effects are applied: direct staff
//! action and request acceptance both land here, so the record + task
//! bookkeeping can't drift between entry points.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::database::models::{ActionKind, ExpiryTask, Infraction, now_ts};
use crate::database::repository::{InfractionRepo, TaskRepo};
use crate::gateway::{DynModerationGateway, ModerationGateway};

/// Applies punitive actions and schedules their reversal.
pub struct ModerationActions {
    gateway: DynModerationGateway,
    infractions: Arc<InfractionRepo>,
    tasks: Arc<TaskRepo>,
}

impl ModerationActions {
    pub fn new(
        gateway: DynModerationGateway,
        infractions: Arc<InfractionRepo>,
        tasks: Arc<TaskRepo>,
    ) -> Self {
        Self {
            gateway,
            infractions,
            tasks,
        }
    }

    /// Apply an action to a target, record the infraction, and schedule the
    /// reversal when a duration is given.
    ///
    /// A platform failure on apply is logged but does not void the record:
    /// the infraction stands as issued, and platform state is reconciled by
    /// the event reactors.
    pub async fn issue(
        &self,
        guild_id: u64,
        target_id: u64,
        kind: ActionKind,
        reason: Option<String>,
        duration_secs: Option<u64>,
        issued_by: u64,
    ) -> Result<Infraction> {
        if let Err(e) = self.gateway.apply(kind, guild_id, target_id).await {
            warn!(
                "failed to apply {} to user {} in guild {}: {}",
                kind.as_str(),
                target_id,
                guild_id,
                e
            );
        }

        let mut infraction =
            Infraction::new(guild_id, target_id, kind, reason, duration_secs, issued_by);
        let id = self.infractions.insert(&infraction).await?;
        infraction.id = Some(id);

        if let Some(expires_at) = infraction.expires_at() {
            self.tasks
                .upsert(guild_id, target_id, kind, id, expires_at)
                .await?;
        }

        info!(
            "issued {} for user {} in guild {} (timed: {})",
            kind.as_str(),
            target_id,
            guild_id,
            duration_secs.is_some()
        );

        Ok(infraction)
    }

    /// Lift an expired effect and drop its task.
    ///
    /// Best-effort by policy: a failed reversal (target gone, already
    /// lifted manually, transient platform error) is logged and the task is
    /// removed anyway; retrying an impossible reversal forever is worse
    /// than one missed attempt. The delete no-ops if a reactor got there
    /// first.
    pub async fn revert_expired(&self, task: &ExpiryTask) -> Result<()> {
        info!(
            "reverting expired {} for user {} in guild {}",
            task.kind.as_str(),
            task.user_id,
            task.guild_id
        );

        if let Err(e) = self
            .gateway
            .remove(task.kind, task.guild_id, task.user_id)
            .await
        {
            error!(
                "failed to remove {} for user {} in guild {}: {}",
                task.kind.as_str(),
                task.user_id,
                task.guild_id,
                e
            );
        }

        self.tasks
            .delete(task.guild_id, task.user_id, task.kind)
            .await?;

        Ok(())
    }

    /// How far past expiry a task is at this moment, for logging.
    pub fn overstay_secs(task: &ExpiryTask) -> i64 {
        (now_ts() - task.expires_at).max(0)
    }
}
