//! Action tokens carried by staff-facing UI components.
//!
//! A token encodes which entity a button or form refers to and what
//! pressing it means, so the interaction round-trips through the platform
//! as an opaque string. The reason-collection phase is part of the token:
//! phase two of a resolve re-enters with the same token marked
//! `awaiting_reason`.

use mongodb::bson::oid::ObjectId;

use crate::database::models::{Capability, ResolutionAction, ReviewFamily};

const PREFIX: &str = "vgl";

/// The reviewable entity kinds a token can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    UserReport,
    MessageReport,
    BanRequest,
    MuteRequest,
}

impl EntityKind {
    pub fn family(self) -> ReviewFamily {
        match self {
            Self::UserReport | Self::MessageReport => ReviewFamily::Report,
            Self::BanRequest | Self::MuteRequest => ReviewFamily::Request,
        }
    }

    /// The capability required to resolve entities of this kind.
    pub fn capability(self) -> Capability {
        match self {
            Self::UserReport | Self::MessageReport => Capability::ResolveReports,
            Self::BanRequest => Capability::ResolveBanRequests,
            Self::MuteRequest => Capability::ResolveMuteRequests,
        }
    }

    /// Human-readable name for reply text.
    pub fn describe(self) -> &'static str {
        match self {
            Self::UserReport => "user report",
            Self::MessageReport => "message report",
            Self::BanRequest => "ban request",
            Self::MuteRequest => "mute request",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Self::UserReport => "ru",
            Self::MessageReport => "rm",
            Self::BanRequest => "qb",
            Self::MuteRequest => "qm",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "ru" => Some(Self::UserReport),
            "rm" => Some(Self::MessageReport),
            "qb" => Some(Self::BanRequest),
            "qm" => Some(Self::MuteRequest),
            _ => None,
        }
    }
}

fn action_code(action: ResolutionAction) -> &'static str {
    match action {
        ResolutionAction::Accept => "a",
        ResolutionAction::Deny => "d",
        ResolutionAction::Disregard => "x",
    }
}

fn action_from_code(code: &str) -> Option<ResolutionAction> {
    match code {
        "a" => Some(ResolutionAction::Accept),
        "d" => Some(ResolutionAction::Deny),
        "x" => Some(ResolutionAction::Disregard),
        _ => None,
    }
}

/// A decoded staff interaction: what to do, to which entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionToken {
    pub entity: EntityKind,
    pub action: ResolutionAction,
    pub id: ObjectId,
    /// Set when phase one deferred for reason collection; phase two
    /// re-enters carrying this marker plus the collected reason.
    pub awaiting_reason: bool,
}

impl ActionToken {
    pub fn new(entity: EntityKind, action: ResolutionAction, id: ObjectId) -> Self {
        Self {
            entity,
            action,
            id,
            awaiting_reason: false,
        }
    }

    /// The same token, marked as expecting a reason on re-entry.
    #[must_use]
    pub fn awaiting_reason(mut self) -> Self {
        self.awaiting_reason = true;
        self
    }

    /// Encode to the compact string placed in a UI component id.
    pub fn encode(&self) -> String {
        if self.awaiting_reason {
            format!(
                "{}:{}:{}:r:{}",
                PREFIX,
                self.entity.code(),
                action_code(self.action),
                self.id.to_hex()
            )
        } else {
            format!(
                "{}:{}:{}:{}",
                PREFIX,
                self.entity.code(),
                action_code(self.action),
                self.id.to_hex()
            )
        }
    }

    /// Decode a component id. Returns `None` for anything that isn't a
    /// well-formed token, including ids belonging to other components.
    pub fn decode(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split(':').collect();

        let (entity, action, awaiting_reason, id) = match parts.as_slice() {
            [PREFIX, entity, action, id] => (entity, action, false, id),
            [PREFIX, entity, action, "r", id] => (entity, action, true, id),
            _ => return None,
        };

        Some(Self {
            entity: EntityKind::from_code(entity)?,
            action: action_from_code(action)?,
            id: ObjectId::parse_str(id).ok()?,
            awaiting_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let id = ObjectId::new();
        for entity in [
            EntityKind::UserReport,
            EntityKind::MessageReport,
            EntityKind::BanRequest,
            EntityKind::MuteRequest,
        ] {
            for action in [
                ResolutionAction::Accept,
                ResolutionAction::Deny,
                ResolutionAction::Disregard,
            ] {
                let token = ActionToken::new(entity, action, id);
                assert_eq!(ActionToken::decode(&token.encode()), Some(token));
            }
        }
    }

    #[test]
    fn reason_phase_survives_the_round_trip() {
        let token = ActionToken::new(
            EntityKind::BanRequest,
            ResolutionAction::Deny,
            ObjectId::new(),
        )
        .awaiting_reason();

        let decoded = ActionToken::decode(&token.encode()).unwrap();
        assert!(decoded.awaiting_reason);
        assert_eq!(decoded, token);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(ActionToken::decode(""), None);
        assert_eq!(ActionToken::decode("something:else"), None);
        assert_eq!(ActionToken::decode("vgl:ru:a:not-an-oid"), None);
        assert_eq!(ActionToken::decode("vgl:zz:a:507f1f77bcf86cd799439011"), None);
        assert_eq!(ActionToken::decode("vgl:ru:z:507f1f77bcf86cd799439011"), None);
        assert_eq!(
            ActionToken::decode("other:ru:a:507f1f77bcf86cd799439011"),
            None
        );
    }
}
