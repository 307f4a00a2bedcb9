//! Action request repository.

use anyhow::{Context, Result};
use futures::StreamExt;
use mongodb::Collection;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use tracing::debug;

use crate::database::Database;
use crate::database::models::{ActionRequest, ResolutionAction, ResolutionStatus, now_ts};

/// Repository for ban/mute requests.
///
/// Shares the reports' exactly-once transition discipline: a
/// status-filtered `find_one_and_update` lets precisely one of any racing
/// approvals land.
pub struct RequestRepo {
    collection: Collection<ActionRequest>,
}

impl RequestRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("action_requests"),
        }
    }

    /// Insert a new pending request, returning its id.
    pub async fn insert(&self, request: &ActionRequest) -> Result<ObjectId> {
        let result = self.collection.insert_one(request).await?;
        result
            .inserted_id
            .as_object_id()
            .context("inserted request has no ObjectId")
    }

    /// Look up a request by id, scoped to the guild.
    pub async fn get(&self, guild_id: u64, id: ObjectId) -> Result<Option<ActionRequest>> {
        let filter = doc! { "_id": id, "guild_id": guild_id as i64 };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Transition a pending request to the action's terminal status.
    /// `None` means missing or already resolved.
    pub async fn resolve(
        &self,
        guild_id: u64,
        id: ObjectId,
        action: ResolutionAction,
        resolver_id: u64,
        note: Option<&str>,
    ) -> Result<Option<ActionRequest>> {
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
            "resolve request {} as {}: {}",
            id,
            action.as_str(),
            updated.is_some()
        );

        Ok(updated)
    }

    /// All pending requests naming a target in a guild.
    pub async fn open_for_target(
        &self,
        guild_id: u64,
        target_id: u64,
    ) -> Result<Vec<ActionRequest>> {
        let filter = doc! {
            "guild_id": guild_id as i64,
            "target_id": target_id as i64,
            "status": ResolutionStatus::Pending.as_str(),
        };

        let mut cursor = self.collection.find(filter).await?;
        let mut requests = Vec::new();
        while let Some(request) = cursor.next().await {
            requests.push(request?);
        }

        Ok(requests)
    }

    /// Auto-resolve every pending request naming a target. Returns the
    /// requests that were open so the caller can clean up their alerts.
    pub async fn auto_resolve_for_target(
        &self,
        guild_id: u64,
        target_id: u64,
        system_id: u64,
    ) -> Result<Vec<ActionRequest>> {
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
            "auto-resolved {} requests for user {} in guild {}",
            result.modified_count, target_id, guild_id
        );

        Ok(open)
    }
}
