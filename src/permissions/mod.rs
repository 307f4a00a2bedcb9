//! Staff capability checks.
//!
//! Capabilities are named grants in the guild's configuration, looked up
//! through the cached config repository. Operators configured at the
//! process level bypass per-guild grants.

use std::sync::Arc;

use tracing::debug;

use crate::database::repository::GuildConfigRepo;
use crate::database::models::Capability;
use crate::error::ModerationError;

/// Identity of a staff member performing an action: their user id plus the
/// role ids the platform reports for them. A grant may name either.
#[derive(Debug, Clone)]
pub struct StaffActor {
    pub user_id: u64,
    pub role_ids: Vec<u64>,
}

impl StaffActor {
    pub fn new(user_id: u64, role_ids: Vec<u64>) -> Self {
        Self { user_id, role_ids }
    }

    /// All principal ids a grant could match for this actor.
    fn principals(&self) -> Vec<u64> {
        let mut ids = Vec::with_capacity(self.role_ids.len() + 1);
        ids.push(self.user_id);
        ids.extend_from_slice(&self.role_ids);
        ids
    }
}

/// Capability checker over guild configuration.
#[derive(Clone)]
pub struct Permissions {
    config: Arc<GuildConfigRepo>,
    operator_ids: Vec<u64>,
}

impl Permissions {
    pub fn new(config: Arc<GuildConfigRepo>, operator_ids: Vec<u64>) -> Self {
        Self {
            config,
            operator_ids,
        }
    }

    /// Whether a user is a process-level operator.
    #[inline]
    pub fn is_operator(&self, user_id: u64) -> bool {
        self.operator_ids.contains(&user_id)
    }

    /// Whether the actor holds a capability in a guild.
    pub async fn has_capability(
        &self,
        guild_id: u64,
        actor: &StaffActor,
        capability: Capability,
    ) -> anyhow::Result<bool> {
        if self.is_operator(actor.user_id) {
            debug!("user {} is operator, granting {}", actor.user_id, capability);
            return Ok(true);
        }

        let config = self.config.get(guild_id).await?;
        Ok(config.grants_to(&actor.principals(), capability))
    }

    /// Require a capability, failing with `PermissionDenied` naming it.
    pub async fn require(
        &self,
        guild_id: u64,
        actor: &StaffActor,
        capability: Capability,
    ) -> Result<(), ModerationError> {
        if self.has_capability(guild_id, actor, capability).await? {
            Ok(())
        } else {
            Err(ModerationError::PermissionDenied(capability))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_principals_include_user_and_roles() {
        let actor = StaffActor::new(1, vec![10, 20]);
        assert_eq!(actor.principals(), vec![1, 10, 20]);
    }
}
