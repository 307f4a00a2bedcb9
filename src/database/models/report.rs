//! Incident reports submitted by community members.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::common::{AlertRef, ResolutionStatus, now_ts};

/// What a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    User,
    Message,
}

/// One reported incident.
///
/// Status moves Pending → terminal exactly once; the repository is the only
/// status writer and enforces the single transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub guild_id: u64,
    pub kind: ReportKind,
    pub reporter_id: u64,
    pub target_id: u64,

    /// The reported message, for message reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<u64>,

    /// Reason supplied by the reporter.
    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub status: ResolutionStatus,

    /// Staff member (or system identity) that closed the report.
    #[serde(default)]
    pub resolved_by: Option<u64>,
    #[serde(default)]
    pub resolved_at: Option<i64>,

    /// Note attached at resolution time (e.g. a deny reason).
    #[serde(default)]
    pub resolution_note: Option<String>,

    pub created_at: i64,

    /// The staff alert message announcing this report, removed once the
    /// report no longer needs action.
    #[serde(default)]
    pub alert: Option<AlertRef>,
}

impl Report {
    /// Create a pending user report.
    pub fn user(guild_id: u64, reporter_id: u64, target_id: u64, reason: Option<String>) -> Self {
        Self::new(guild_id, ReportKind::User, reporter_id, target_id, None, reason)
    }

    /// Create a pending message report.
    pub fn message(
        guild_id: u64,
        reporter_id: u64,
        target_id: u64,
        message_id: u64,
        reason: Option<String>,
    ) -> Self {
        Self::new(
            guild_id,
            ReportKind::Message,
            reporter_id,
            target_id,
            Some(message_id),
            reason,
        )
    }

    fn new(
        guild_id: u64,
        kind: ReportKind,
        reporter_id: u64,
        target_id: u64,
        message_id: Option<u64>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: None,
            guild_id,
            kind,
            reporter_id,
            target_id,
            message_id,
            reason,
            status: ResolutionStatus::Pending,
            resolved_by: None,
            resolved_at: None,
            resolution_note: None,
            created_at: now_ts(),
            alert: None,
        }
    }
}
