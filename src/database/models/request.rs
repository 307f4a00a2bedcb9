//! Staff-originated privileged-action proposals.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::common::{ActionKind, AlertRef, ResolutionStatus, now_ts};

/// A proposed ban or mute awaiting second-approver sign-off.
///
/// Same single-transition lifecycle as a report, additionally carrying the
/// proposed action itself so acceptance can execute it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub guild_id: u64,

    /// The action being proposed.
    pub action: ActionKind,

    /// Staff member who proposed it.
    pub proposer_id: u64,
    pub target_id: u64,

    /// Reason for the proposed action; becomes the infraction reason on
    /// acceptance.
    pub reason: String,

    /// Proposed duration in seconds; `None` means indefinite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,

    #[serde(default)]
    pub status: ResolutionStatus,

    #[serde(default)]
    pub resolved_by: Option<u64>,
    #[serde(default)]
    pub resolved_at: Option<i64>,

    /// Note attached at resolution time (e.g. a deny reason).
    #[serde(default)]
    pub resolution_note: Option<String>,

    pub created_at: i64,

    /// The staff alert message announcing this request.
    #[serde(default)]
    pub alert: Option<AlertRef>,
}

impl ActionRequest {
    pub fn new(
        guild_id: u64,
        action: ActionKind,
        proposer_id: u64,
        target_id: u64,
        reason: String,
        duration_secs: Option<u64>,
    ) -> Self {
        Self {
            id: None,
            guild_id,
            action,
            proposer_id,
            target_id,
            reason,
            duration_secs,
            status: ResolutionStatus::Pending,
            resolved_by: None,
            resolved_at: None,
            resolution_note: None,
            created_at: now_ts(),
            alert: None,
        }
    }

    /// Whether acceptance schedules a reversal.
    pub fn is_timed(&self) -> bool {
        self.duration_secs.is_some()
    }
}
