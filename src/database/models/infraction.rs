//! Recorded punitive actions.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::common::{ActionKind, now_ts};

/// A punitive action applied to a target in a guild.
///
/// The record outlives the effect: expiry or manual reversal removes the
/// platform-side restriction but the infraction stays as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Infraction {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub guild_id: u64,
    pub user_id: u64,
    pub kind: ActionKind,

    #[serde(default)]
    pub reason: Option<String>,

    /// Staff member who issued it.
    pub issued_by: u64,

    /// Duration in seconds; `None` means indefinite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,

    pub created_at: i64,
}

impl Infraction {
    pub fn new(
        guild_id: u64,
        user_id: u64,
        kind: ActionKind,
        reason: Option<String>,
        duration_secs: Option<u64>,
        issued_by: u64,
    ) -> Self {
        Self {
            id: None,
            guild_id,
            user_id,
            kind,
            reason,
            issued_by,
            duration_secs,
            created_at: now_ts(),
        }
    }

    /// When the effect should lapse, if timed.
    pub fn expires_at(&self) -> Option<i64> {
        self.duration_secs.map(|d| self.created_at + d as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_only_for_timed_infractions() {
        let timed = Infraction::new(1, 2, ActionKind::Mute, None, Some(60), 3);
        assert_eq!(timed.expires_at(), Some(timed.created_at + 60));

        let indefinite = Infraction::new(1, 2, ActionKind::Ban, None, None, 3);
        assert_eq!(indefinite.expires_at(), None);
    }
}
