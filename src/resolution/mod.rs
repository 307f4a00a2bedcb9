//! Resolution state machine for reports and requests.
//!
//! Drives the Pending → terminal lifecycle: capability check, optional
//! two-phase reason collection, the exactly-once status transition, accept
//! side effects, and alert cleanup. Stale references (the entity vanished
//! under a still-visible alert) resolve to a recoverable reply plus a
//! grace-delayed alert deletion, tolerating consistency lag between racing
//! staff.

mod token;

pub use token::{ActionToken, EntityKind};

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::database::models::{
    ActionRequest, AlertRef, Report, ResolutionAction, ResolutionStatus,
};
use crate::database::repository::{GuildConfigRepo, ReportRepo, RequestRepo};
use crate::error::ModerationError;
use crate::gateway::{AlertGateway, DynAlertGateway};
use crate::moderation::ModerationActions;
use crate::permissions::{Permissions, StaffActor};
use crate::scheduler::run_after;
use crate::utils::format_duration;

/// What the interaction layer should do after a resolve call.
#[derive(Debug)]
pub enum Resolution {
    /// The flow completed (successfully or benignly); reply to the actor.
    Done(ReplyPayload),
    /// A free-text reason must be collected first; re-invoke `resolve`
    /// with the reason attached and this token.
    CollectReason { token: ActionToken },
}

/// Reply handed back to the interaction layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub content: String,
    pub ephemeral: bool,
}

impl ReplyPayload {
    /// A reply visible only to the acting staff member.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// Either reviewable entity, after lookup.
enum Entity {
    Report(Report),
    Request(ActionRequest),
}

impl Entity {
    fn status(&self) -> ResolutionStatus {
        match self {
            Self::Report(r) => r.status,
            Self::Request(r) => r.status,
        }
    }

    fn alert(&self) -> Option<AlertRef> {
        match self {
            Self::Report(r) => r.alert,
            Self::Request(r) => r.alert,
        }
    }
}

/// Inner-flow outcome, before reply shaping.
enum Outcome {
    Completed(Entity),
    NeedsReason(ActionToken),
}

/// The resolution engine.
pub struct ResolutionEngine {
    runtime: Arc<RuntimeConfig>,
    config: Arc<GuildConfigRepo>,
    reports: Arc<ReportRepo>,
    requests: Arc<RequestRepo>,
    actions: Arc<ModerationActions>,
    permissions: Permissions,
    alerts: DynAlertGateway,
    /// Entities whose stale alert already has a deletion in flight, so a
    /// second click during the grace window doesn't schedule another.
    pending_removals: Arc<DashMap<ObjectId, ()>>,
}

impl ResolutionEngine {
    pub fn new(
        runtime: Arc<RuntimeConfig>,
        config: Arc<GuildConfigRepo>,
        reports: Arc<ReportRepo>,
        requests: Arc<RequestRepo>,
        actions: Arc<ModerationActions>,
        permissions: Permissions,
        alerts: DynAlertGateway,
    ) -> Self {
        Self {
            runtime,
            config,
            reports,
            requests,
            actions,
            permissions,
            alerts,
            pending_removals: Arc::new(DashMap::new()),
        }
    }

    /// Resolve a staff interaction against the entity its token names.
    ///
    /// `source_alert` is the alert message the interaction came from.
    /// Persistence failures propagate; every other outcome is a normal
    /// [`Resolution`] carrying a short human-readable reply.
    pub async fn resolve(
        &self,
        guild_id: u64,
        token: ActionToken,
        actor: &StaffActor,
        source_alert: Option<AlertRef>,
        reason: Option<String>,
    ) -> anyhow::Result<Resolution> {
        match self.try_resolve(guild_id, token, actor, reason).await {
            Ok(Outcome::Completed(resolved)) => {
                // The entity reached a terminal state; its alert no longer
                // needs action.
                if let Some(alert) = source_alert {
                    self.remove_alert(alert).await;
                }
                if let Some(alert) = resolved.alert()
                    && Some(alert) != source_alert
                {
                    self.remove_alert(alert).await;
                }

                info!(
                    "{} {} {} by user {}",
                    token.entity.describe(),
                    token.id,
                    token.action.status().as_str(),
                    actor.user_id
                );

                Ok(Resolution::Done(ReplyPayload::ephemeral(
                    reply_text(&token, &resolved),
                )))
            }
            Ok(Outcome::NeedsReason(token)) => Ok(Resolution::CollectReason { token }),
            Err(ModerationError::NotFound) => {
                // Stale UI element: the entity is gone but its alert
                // survived. Deletion waits out the grace window in case a
                // concurrent resolution elsewhere hasn't propagated yet.
                if let Some(alert) = source_alert {
                    self.schedule_stale_removal(
                        token.id,
                        alert,
                        self.runtime.alert_grace(token.entity.family()),
                    );
                }
                Ok(Resolution::Done(ReplyPayload::ephemeral(format!(
                    "That {} no longer exists; the alert will be cleaned up shortly.",
                    token.entity.describe()
                ))))
            }
            Err(ModerationError::AlreadyResolved) => {
                if let Some(alert) = source_alert {
                    self.remove_alert(alert).await;
                }
                Ok(Resolution::Done(ReplyPayload::ephemeral(format!(
                    "This {} was already handled by another staff member.",
                    token.entity.describe()
                ))))
            }
            Err(ModerationError::PermissionDenied(capability)) => {
                debug!(
                    "user {} denied {} on {}: missing {}",
                    actor.user_id,
                    token.action.as_str(),
                    token.entity.describe(),
                    capability
                );
                Ok(Resolution::Done(ReplyPayload::ephemeral(format!(
                    "You need the `{}` capability to do that.",
                    capability
                ))))
            }
            Err(ModerationError::ActionFailed(e)) => {
                warn!("platform action failed during resolve: {}", e);
                Ok(Resolution::Done(ReplyPayload::ephemeral(
                    "The platform rejected the action; the entry was still resolved.",
                )))
            }
            Err(ModerationError::Persistence(e)) => Err(e),
        }
    }

    /// The state machine proper: lookup, capability gate, reason gate,
    /// exactly-once transition, accept side effects.
    async fn try_resolve(
        &self,
        guild_id: u64,
        token: ActionToken,
        actor: &StaffActor,
        reason: Option<String>,
    ) -> Result<Outcome, ModerationError> {
        let entity = match token.entity {
            EntityKind::UserReport | EntityKind::MessageReport => self
                .reports
                .get(guild_id, token.id)
                .await?
                .map(Entity::Report),
            EntityKind::BanRequest | EntityKind::MuteRequest => self
                .requests
                .get(guild_id, token.id)
                .await?
                .map(Entity::Request),
        };
        let entity = entity.ok_or(ModerationError::NotFound)?;

        if entity.status().is_terminal() {
            return Err(ModerationError::AlreadyResolved);
        }

        // Capability gate precedes any state change; on failure the alert
        // stays in place for staff who are allowed to act.
        self.permissions
            .require(guild_id, actor, token.entity.capability())
            .await?;

        // Two-phase reason collection: phase one defers, phase two
        // re-enters with the reason attached.
        let reason = reason.filter(|r| !r.trim().is_empty());
        let guild = self.config.get(guild_id).await?;
        if guild
            .reason_policy(token.entity.family())
            .requires(token.action)
            && reason.is_none()
        {
            return Ok(Outcome::NeedsReason(token.awaiting_reason()));
        }

        // Exactly-once transition; losing a race between the lookup above
        // and this update is benign.
        let resolved = match &entity {
            Entity::Report(_) => self
                .reports
                .resolve(
                    guild_id,
                    token.id,
                    token.action,
                    actor.user_id,
                    reason.as_deref(),
                )
                .await?
                .map(Entity::Report),
            Entity::Request(_) => self
                .requests
                .resolve(
                    guild_id,
                    token.id,
                    token.action,
                    actor.user_id,
                    reason.as_deref(),
                )
                .await?
                .map(Entity::Request),
        };
        let resolved = resolved.ok_or(ModerationError::AlreadyResolved)?;

        // Accepting a request executes the proposed action.
        if token.action == ResolutionAction::Accept
            && let Entity::Request(request) = &resolved
        {
            self.actions
                .issue(
                    guild_id,
                    request.target_id,
                    request.action,
                    Some(request.reason.clone()),
                    request.duration_secs,
                    actor.user_id,
                )
                .await?;
        }

        Ok(Outcome::Completed(resolved))
    }

    /// Auto-resolve every open report/request naming a target, cleaning up
    /// their alerts. Returns how many entities were closed.
    pub async fn auto_resolve_target(
        &self,
        guild_id: u64,
        target_id: u64,
    ) -> anyhow::Result<usize> {
        let system = self.runtime.system_actor_id;
        let mut closed = 0;

        for report in self
            .reports
            .auto_resolve_for_target(guild_id, target_id, system)
            .await?
        {
            closed += 1;
            if let Some(alert) = report.alert {
                self.remove_alert(alert).await;
            }
        }

        for request in self
            .requests
            .auto_resolve_for_target(guild_id, target_id, system)
            .await?
        {
            closed += 1;
            if let Some(alert) = request.alert {
                self.remove_alert(alert).await;
            }
        }

        if closed > 0 {
            info!(
                "auto-resolved {} open entries for user {} in guild {}",
                closed, target_id, guild_id
            );
        }

        Ok(closed)
    }

    /// Remove an alert now; failures are logged, never surfaced.
    async fn remove_alert(&self, alert: AlertRef) {
        if let Err(e) = self.alerts.remove_alert(alert).await {
            warn!(
                "failed to remove alert message {} in channel {}: {}",
                alert.message_id, alert.channel_id, e
            );
        }
    }

    /// Schedule a stale alert's deletion after the grace delay, once per
    /// entity id no matter how many times staff click it meanwhile.
    fn schedule_stale_removal(&self, entity_id: ObjectId, alert: AlertRef, grace: Duration) {
        if self.pending_removals.insert(entity_id, ()).is_some() {
            return;
        }

        debug!(
            "removing stale alert message {} in {:?}",
            alert.message_id, grace
        );

        let alerts = Arc::clone(&self.alerts);
        let pending = Arc::clone(&self.pending_removals);
        run_after(grace, async move {
            if let Err(e) = alerts.remove_alert(alert).await {
                warn!("failed to remove stale alert {}: {}", alert.message_id, e);
            }
            pending.remove(&entity_id);
        });
    }
}

fn reply_text(token: &ActionToken, resolved: &Entity) -> String {
    let what = token.entity.describe();
    match token.action {
        ResolutionAction::Accept => match resolved {
            Entity::Request(request) => match request.duration_secs {
                Some(secs) => format!(
                    "{} accepted: {} applied for {}.",
                    capitalize(what),
                    request.action.as_str(),
                    format_duration(secs)
                ),
                None => format!(
                    "{} accepted: {} applied.",
                    capitalize(what),
                    request.action.as_str()
                ),
            },
            Entity::Report(_) => format!("{} accepted.", capitalize(what)),
        },
        ResolutionAction::Deny => format!("{} denied.", capitalize(what)),
        ResolutionAction::Disregard => {
            format!("{} disregarded; no action taken.", capitalize(what))
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("ban request"), "Ban request");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn accept_reply_includes_duration() {
        let request = ActionRequest::new(
            1,
            crate::database::models::ActionKind::Ban,
            2,
            3,
            "spam".into(),
            Some(7200),
        );
        let token = ActionToken::new(
            EntityKind::BanRequest,
            ResolutionAction::Accept,
            ObjectId::new(),
        );

        let text = reply_text(&token, &Entity::Request(request));
        assert_eq!(text, "Ban request accepted: ban applied for 2h.");
    }
}
