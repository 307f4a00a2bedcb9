//! Service composition root.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cache::CacheRegistry;
use crate::config::RuntimeConfig;
use crate::database::Database;
use crate::database::models::{
    ActionKind, ActionRequest, AlertRef, Infraction, Report,
};
use crate::database::repository::{
    GuildConfigRepo, InfractionRepo, ReportRepo, RequestRepo, TaskRepo,
};
use crate::events;
use crate::gateway::{DynAlertGateway, DynModerationGateway};
use crate::moderation::ModerationActions;
use crate::permissions::{Permissions, StaffActor};
use crate::resolution::{ActionToken, Resolution, ReplyPayload, ResolutionEngine};
use crate::scheduler::ExpirySweeper;

/// The assembled moderation backend.
///
/// Owns the store, caches, and engine; the embedding process supplies the
/// platform gateways and feeds interactions and events in. Created at
/// process start, dropped at process stop, no hidden globals.
pub struct ModerationService {
    pub runtime: Arc<RuntimeConfig>,
    pub db: Arc<Database>,
    pub cache: Arc<CacheRegistry>,

    pub config: Arc<GuildConfigRepo>,
    pub tasks: Arc<TaskRepo>,
    pub reports: Arc<ReportRepo>,
    pub requests: Arc<RequestRepo>,
    pub infractions: Arc<InfractionRepo>,

    pub permissions: Permissions,
    pub actions: Arc<ModerationActions>,
    pub engine: Arc<ResolutionEngine>,
}

impl ModerationService {
    /// Connect to the store and wire the whole subsystem together.
    pub async fn connect(
        runtime: RuntimeConfig,
        gateway: DynModerationGateway,
        alerts: DynAlertGateway,
    ) -> Result<Self> {
        let runtime = Arc::new(runtime);

        let db = Arc::new(
            Database::connect(&runtime.mongodb_uri, &runtime.mongodb_database).await?,
        );
        let cache = Arc::new(CacheRegistry::new());

        let config = Arc::new(GuildConfigRepo::new(&db, &cache));
        let tasks = Arc::new(TaskRepo::new(&db));
        let reports = Arc::new(ReportRepo::new(&db));
        let requests = Arc::new(RequestRepo::new(&db));
        let infractions = Arc::new(InfractionRepo::new(&db));

        let permissions = Permissions::new(Arc::clone(&config), runtime.operator_ids.clone());
        let actions = Arc::new(ModerationActions::new(
            gateway,
            Arc::clone(&infractions),
            Arc::clone(&tasks),
        ));
        let engine = Arc::new(ResolutionEngine::new(
            Arc::clone(&runtime),
            Arc::clone(&config),
            Arc::clone(&reports),
            Arc::clone(&requests),
            Arc::clone(&actions),
            permissions.clone(),
            alerts,
        ));

        info!("moderation service ready");

        Ok(Self {
            runtime,
            db,
            cache,
            config,
            tasks,
            reports,
            requests,
            infractions,
            permissions,
            actions,
            engine,
        })
    }

    /// Spawn the expiry sweeper onto the runtime.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        ExpirySweeper::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.actions),
            &self.runtime,
        )
        .start()
    }

    // --- entry points: staff interactions -------------------------------

    /// Resolve a staff interaction. Persistence failures are folded into a
    /// generic failure reply here; the interaction layer never sees an
    /// error it would have to interpret.
    pub async fn resolve(
        &self,
        guild_id: u64,
        token: ActionToken,
        actor: &StaffActor,
        source_alert: Option<AlertRef>,
        reason: Option<String>,
    ) -> Resolution {
        match self
            .engine
            .resolve(guild_id, token, actor, source_alert, reason)
            .await
        {
            Ok(resolution) => resolution,
            Err(e) => {
                error!("resolve failed in guild {}: {:#}", guild_id, e);
                Resolution::Done(ReplyPayload::ephemeral(
                    "Something went wrong; please try again.",
                ))
            }
        }
    }

    /// File a report, returning it with its id and alert reference set.
    pub async fn submit_report(&self, mut report: Report, alert: Option<AlertRef>) -> Result<Report> {
        report.alert = alert;
        let id = self.reports.insert(&report).await?;
        report.id = Some(id);
        Ok(report)
    }

    /// File a privileged-action request awaiting second-approver sign-off.
    pub async fn submit_request(
        &self,
        mut request: ActionRequest,
        alert: Option<AlertRef>,
    ) -> Result<ActionRequest> {
        request.alert = alert;
        let id = self.requests.insert(&request).await?;
        request.id = Some(id);
        Ok(request)
    }

    /// Issue an infraction directly (no second approver involved).
    pub async fn issue_infraction(
        &self,
        guild_id: u64,
        target_id: u64,
        kind: ActionKind,
        reason: Option<String>,
        duration_secs: Option<u64>,
        issued_by: u64,
    ) -> Result<Infraction> {
        self.actions
            .issue(guild_id, target_id, kind, reason, duration_secs, issued_by)
            .await
    }

    /// Moderation history for a target, newest first.
    pub async fn history(
        &self,
        guild_id: u64,
        target_id: u64,
        limit: i64,
    ) -> Result<Vec<Infraction>> {
        self.infractions.for_target(guild_id, target_id, limit).await
    }

    // --- entry points: platform events ----------------------------------
    //
    // Reactor failures are logged and swallowed: reconciliation must never
    // take the event pipeline down with it.

    pub async fn member_banned(&self, guild_id: u64, user_id: u64) {
        if let Err(e) = events::on_member_banned(self, guild_id, user_id).await {
            error!("member_banned reactor failed: {:#}", e);
        }
    }

    pub async fn member_unbanned(&self, guild_id: u64, user_id: u64) {
        if let Err(e) = events::on_member_unbanned(self, guild_id, user_id).await {
            error!("member_unbanned reactor failed: {:#}", e);
        }
    }

    pub async fn member_unmuted(&self, guild_id: u64, user_id: u64) {
        if let Err(e) = events::on_member_unmuted(self, guild_id, user_id).await {
            error!("member_unmuted reactor failed: {:#}", e);
        }
    }

    pub async fn guild_joined(&self, guild_id: u64) {
        if let Err(e) = events::on_guild_joined(self, guild_id).await {
            error!("guild_joined reactor failed: {:#}", e);
        }
    }
}
