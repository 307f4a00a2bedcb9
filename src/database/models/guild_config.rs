//! Per-guild moderation configuration.

use std::fmt;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::common::{ResolutionAction, ReviewFamily, now_ts};

/// Named staff capabilities checked before resolution actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ResolveReports,
    ResolveBanRequests,
    ResolveMuteRequests,
    ManageGuildConfig,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveReports => "resolve_reports",
            Self::ResolveBanRequests => "resolve_ban_requests",
            Self::ResolveMuteRequests => "resolve_mute_requests",
            Self::ManageGuildConfig => "manage_guild_config",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether accepting/denying entities of a family demands a free-text
/// reason. Disregard is exempt by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonPolicy {
    #[serde(default)]
    pub on_accept: bool,
    #[serde(default = "default_true")]
    pub on_deny: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReasonPolicy {
    fn default() -> Self {
        Self {
            on_accept: false,
            on_deny: true,
        }
    }
}

impl ReasonPolicy {
    /// Whether this policy demands a reason for the given action.
    pub fn requires(&self, action: ResolutionAction) -> bool {
        action.may_require_reason()
            && match action {
                ResolutionAction::Accept => self.on_accept,
                ResolutionAction::Deny => self.on_deny,
                ResolutionAction::Disregard => false,
            }
    }
}

/// A capability granted to a principal (user or role id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityGrant {
    pub principal: u64,
    pub capability: Capability,
}

/// Per-guild configuration document.
///
/// At most one lives in the cache per guild id, and no stale copy is served
/// after a write: every mutation path goes through the repository, which
/// evicts before writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildConfig {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub guild_id: u64,

    /// Guild title (cached for reference)
    #[serde(default)]
    pub title: Option<String>,

    /// Reason policy for user/message reports.
    #[serde(default)]
    pub report_reasons: ReasonPolicy,

    /// Reason policy for ban/mute requests.
    #[serde(default)]
    pub request_reasons: ReasonPolicy,

    /// Capability grants for staff principals.
    #[serde(default)]
    pub grants: Vec<CapabilityGrant>,

    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl GuildConfig {
    /// Create a new config with defaults.
    pub fn new(guild_id: u64) -> Self {
        let now = now_ts();
        Self {
            id: None,
            guild_id,
            title: None,
            report_reasons: ReasonPolicy::default(),
            request_reasons: ReasonPolicy::default(),
            grants: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The reason policy applying to an entity family.
    pub fn reason_policy(&self, family: ReviewFamily) -> &ReasonPolicy {
        match family {
            ReviewFamily::Report => &self.report_reasons,
            ReviewFamily::Request => &self.request_reasons,
        }
    }

    /// Whether any of the given principals holds the capability.
    pub fn grants_to(&self, principals: &[u64], capability: Capability) -> bool {
        self.grants
            .iter()
            .any(|g| g.capability == capability && principals.contains(&g.principal))
    }

    /// Add a grant. Returns false if it already existed.
    pub fn grant(&mut self, principal: u64, capability: Capability) -> bool {
        let grant = CapabilityGrant {
            principal,
            capability,
        };
        if self.grants.contains(&grant) {
            return false;
        }
        self.grants.push(grant);
        true
    }

    /// Remove a grant. Returns false if it wasn't present.
    pub fn revoke(&mut self, principal: u64, capability: Capability) -> bool {
        let before = self.grants.len();
        self.grants
            .retain(|g| !(g.principal == principal && g.capability == capability));
        self.grants.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_and_revoke() {
        let mut config = GuildConfig::new(1);

        assert!(config.grant(10, Capability::ResolveReports));
        assert!(!config.grant(10, Capability::ResolveReports)); // duplicate
        assert!(config.grants_to(&[10], Capability::ResolveReports));
        assert!(!config.grants_to(&[10], Capability::ResolveBanRequests));
        assert!(!config.grants_to(&[11], Capability::ResolveReports));

        assert!(config.revoke(10, Capability::ResolveReports));
        assert!(!config.revoke(10, Capability::ResolveReports)); // already gone
        assert!(!config.grants_to(&[10], Capability::ResolveReports));
    }

    #[test]
    fn grants_match_any_principal() {
        let mut config = GuildConfig::new(1);
        config.grant(500, Capability::ResolveMuteRequests); // role id

        // Actor carries their user id plus role ids.
        assert!(config.grants_to(&[42, 500], Capability::ResolveMuteRequests));
    }

    #[test]
    fn default_reason_policy_requires_deny_reason_only() {
        let config = GuildConfig::new(1);
        let policy = config.reason_policy(ReviewFamily::Report);

        assert!(!policy.requires(ResolutionAction::Accept));
        assert!(policy.requires(ResolutionAction::Deny));
        assert!(!policy.requires(ResolutionAction::Disregard));
    }

    #[test]
    fn disregard_exempt_even_when_all_reasons_required() {
        let policy = ReasonPolicy {
            on_accept: true,
            on_deny: true,
        };
        assert!(policy.requires(ResolutionAction::Accept));
        assert!(!policy.requires(ResolutionAction::Disregard));
    }
}
