//! Shared lifecycle types for reviewable entities.

use serde::{Deserialize, Serialize};

/// Review lifecycle state.
///
/// Everything except `Pending` is terminal: an entity transitions exactly
/// once and is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    #[default]
    Pending,
    Accepted,
    Denied,
    Disregarded,
    AutoResolved,
}

impl ResolutionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The string stored in MongoDB; must match the serde representation
    /// since raw `doc!` filters compare against it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Denied => "denied",
            Self::Disregarded => "disregarded",
            Self::AutoResolved => "autoresolved",
        }
    }
}

/// A staff decision closing out a report or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionAction {
    Accept,
    Deny,
    /// Mark handled with no action taken. Never asks for a reason and never
    /// creates an infraction.
    Disregard,
}

impl ResolutionAction {
    /// The terminal status this action transitions to.
    pub fn status(self) -> ResolutionStatus {
        match self {
            Self::Accept => ResolutionStatus::Accepted,
            Self::Deny => ResolutionStatus::Denied,
            Self::Disregard => ResolutionStatus::Disregarded,
        }
    }

    /// Whether guild configuration may demand a free-text reason for this
    /// action.
    pub fn may_require_reason(self) -> bool {
        !matches!(self, Self::Disregard)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Deny => "deny",
            Self::Disregard => "disregard",
        }
    }
}

/// The two reviewable entity families, used where behavior differs only
/// between reports and requests (reason policies, alert grace delays).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFamily {
    Report,
    Request,
}

/// A punitive effect that can be applied to and removed from a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Mute,
    Ban,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mute => "mute",
            Self::Ban => "ban",
        }
    }
}

/// Location of the staff alert message referencing an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRef {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Current time as unix seconds.
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_open() {
        assert!(!ResolutionStatus::Pending.is_terminal());
        for s in [
            ResolutionStatus::Accepted,
            ResolutionStatus::Denied,
            ResolutionStatus::Disregarded,
            ResolutionStatus::AutoResolved,
        ] {
            assert!(s.is_terminal());
        }
    }

    #[test]
    fn actions_map_to_terminal_statuses() {
        assert_eq!(ResolutionAction::Accept.status(), ResolutionStatus::Accepted);
        assert_eq!(ResolutionAction::Deny.status(), ResolutionStatus::Denied);
        assert_eq!(
            ResolutionAction::Disregard.status(),
            ResolutionStatus::Disregarded
        );
    }

    #[test]
    fn disregard_never_requires_a_reason() {
        assert!(ResolutionAction::Accept.may_require_reason());
        assert!(ResolutionAction::Deny.may_require_reason());
        assert!(!ResolutionAction::Disregard.may_require_reason());
    }

    #[test]
    fn status_strings_match_serde_form() {
        // Raw doc! filters rely on this equivalence.
        for s in [
            ResolutionStatus::Pending,
            ResolutionStatus::Accepted,
            ResolutionStatus::Denied,
            ResolutionStatus::Disregarded,
            ResolutionStatus::AutoResolved,
        ] {
            let bson = mongodb::bson::to_bson(&s).unwrap();
            assert_eq!(bson, mongodb::bson::Bson::String(s.as_str().to_string()));
        }
    }
}
