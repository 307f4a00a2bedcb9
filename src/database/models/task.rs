//! Scheduled reversal tasks for timed infractions.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::common::{ActionKind, now_ts};

/// A pending reversal of a timed infraction.
///
/// At most one exists per (guild, target, kind); issuing a newer timed
/// action for the same triple replaces the old task, so the latest
/// mute/ban always wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryTask {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub guild_id: u64,
    pub user_id: u64,
    pub kind: ActionKind,

    /// The infraction whose effect this task reverses.
    pub infraction_id: ObjectId,

    /// Unix seconds at which the effect should be lifted.
    pub expires_at: i64,

    pub created_at: i64,
}

impl ExpiryTask {
    pub fn new(
        guild_id: u64,
        user_id: u64,
        kind: ActionKind,
        infraction_id: ObjectId,
        expires_at: i64,
    ) -> Self {
        Self {
            id: None,
            guild_id,
            user_id,
            kind,
            infraction_id,
            expires_at,
            created_at: now_ts(),
        }
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_at_and_after_expiry() {
        let task = ExpiryTask::new(1, 2, ActionKind::Mute, ObjectId::new(), 100);

        assert!(!task.is_due(99));
        assert!(task.is_due(100));
        assert!(task.is_due(101));
    }
}
