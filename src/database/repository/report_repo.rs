//! Report repository.

use anyhow::{Context, Result};
use futures::StreamExt;
use mongodb::Collection;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use tracing::debug;

use crate::database::Database;
use crate::database::models::{Report, ResolutionAction, ResolutionStatus, now_ts};

/// Repository for user/message reports.
///
/// The sole writer of report status. The Pending → terminal transition is a
/// status-filtered `find_one_and_update`, so of any number of concurrent
/// resolution attempts exactly one lands; the rest observe `None`.
pub struct ReportRepo {
    collection: Collection<Report>,
}

impl ReportRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("reports"),
        }
    }

    /// Insert a new pending report, returning its id.
    pub async fn insert(&self, report: &Report) -> Result<ObjectId> {
        let result = self.collection.insert_one(report).await?;
        result
            .inserted_id
            .as_object_id()
            .context("inserted report has no ObjectId")
    }

    /// Look up a report by id, scoped to the guild.
    pub async fn get(&self, guild_id: u64, id: ObjectId) -> Result<Option<Report>> {
        let filter = doc! { "_id": id, "guild_id": guild_id as i64 };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Transition a pending report to the action's terminal status.
    ///
    /// Returns the updated report, or `None` if the report is missing or
    /// no longer pending; the caller distinguishes those two by having
    /// looked the entity up first.
    pub async fn resolve(
        &self,
        guild_id: u64,
        id: ObjectId,
        action: ResolutionAction,
        resolver_id: u64,
        note: Option<&str>,
    ) -> Result<Option<Report>> {
        let filter = doc! {
            "_id": id,
            "guild_id": guild_id as i64,
            "status": ResolutionStatus::Pending.as_str(),
        };

        let mut set = doc! {
            "status": action.status().as_str(),
            "resolved_by": resolver_id as i64,
            "resolved_at": now_ts(),
        };
        if let Some(note) = note {
            set.insert("resolution_note", note);
        }

        let options = mongodb::options::FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(filter, doc! { "$set": set })
            .with_options(options)
            .await?;

        debug!(
            "resolve report {} as {}: {}",
            id,
            action.as_str(),
            updated.is_some()
        );

        Ok(updated)
    }

    /// All pending reports naming a target in a guild.
    pub async fn open_for_target(&self, guild_id: u64, target_id: u64) -> Result<Vec<Report>> {
        let filter = doc! {
            "guild_id": guild_id as i64,
            "target_id": target_id as i64,
            "status": ResolutionStatus::Pending.as_str(),
        };

        let mut cursor = self.collection.find(filter).await?;
        let mut reports = Vec::new();
        while let Some(report) = cursor.next().await {
            reports.push(report?);
        }

        Ok(reports)
    }

    /// Auto-resolve every pending report naming a target, recording the
    /// system identity as resolver. Returns the reports that were open so
    /// the caller can clean up their alerts.
    pub async fn auto_resolve_for_target(
        &self,
        guild_id: u64,
        target_id: u64,
        system_id: u64,
    ) -> Result<Vec<Report>> {
        let open = self.open_for_target(guild_id, target_id).await?;
        if open.is_empty() {
            return Ok(open);
        }

        let filter = doc! {
            "guild_id": guild_id as i64,
            "target_id": target_id as i64,
            "status": ResolutionStatus::Pending.as_str(),
        };
        let update = doc! { "$set": {
            "status": ResolutionStatus::AutoResolved.as_str(),
            "resolved_by": system_id as i64,
            "resolved_at": now_ts(),
        }};

        let result = self.collection.update_many(filter, update).await?;
        debug!(
            "auto-resolved {} reports for user {} in guild {}",
            result.modified_count, target_id, guild_id
        );

        Ok(open)
    }
}
