//! Platform collaborator ports.
//!
//! The chat platform is an external service: these traits are the whole of
//! what the lifecycle core asks of it. Implementations live with the
//! embedding process (the concrete platform client); everything here stays
//! wire-protocol agnostic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::database::models::{ActionKind, AlertRef};
use crate::error::GatewayError;

/// Applies and removes punitive effects on the platform.
///
/// Every call may fail (target left, platform-side permission missing,
/// transient error); callers catch and log, so a gateway failure never
/// crashes a loop here.
#[async_trait]
pub trait ModerationGateway: Send + Sync {
    async fn apply_mute(&self, guild_id: u64, user_id: u64) -> Result<(), GatewayError>;
    async fn remove_mute(&self, guild_id: u64, user_id: u64) -> Result<(), GatewayError>;
    async fn apply_ban(&self, guild_id: u64, user_id: u64) -> Result<(), GatewayError>;
    async fn remove_ban(&self, guild_id: u64, user_id: u64) -> Result<(), GatewayError>;

    /// Apply the effect for an action kind.
    async fn apply(&self, kind: ActionKind, guild_id: u64, user_id: u64) -> Result<(), GatewayError> {
        match kind {
            ActionKind::Mute => self.apply_mute(guild_id, user_id).await,
            ActionKind::Ban => self.apply_ban(guild_id, user_id).await,
        }
    }

    /// Remove the effect for an action kind.
    async fn remove(&self, kind: ActionKind, guild_id: u64, user_id: u64) -> Result<(), GatewayError> {
        match kind {
            ActionKind::Mute => self.remove_mute(guild_id, user_id).await,
            ActionKind::Ban => self.remove_ban(guild_id, user_id).await,
        }
    }
}

pub type DynModerationGateway = Arc<dyn ModerationGateway>;

/// Removes staff-facing alert messages once they no longer need action.
#[async_trait]
pub trait AlertGateway: Send + Sync {
    async fn remove_alert(&self, alert: AlertRef) -> Result<(), GatewayError>;
}

pub type DynAlertGateway = Arc<dyn AlertGateway>;
