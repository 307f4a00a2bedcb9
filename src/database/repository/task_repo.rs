//! Expiry task repository.
//!
//! Tasks are keyed by (guild, target, kind): upsert replaces, delete is
//! idempotent. Two independent cancellation triggers (the sweeper firing a
//! task and a reactor observing a manual reversal) both funnel into the
//! same `delete`, so their ordering never matters.

use anyhow::Result;
use futures::StreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use tracing::debug;

use crate::database::Database;
use crate::database::models::{ActionKind, ExpiryTask};

/// Repository for pending reversal tasks.
pub struct TaskRepo {
    collection: Collection<ExpiryTask>,
}

impl TaskRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("expiry_tasks"),
        }
    }

    fn key(guild_id: u64, user_id: u64, kind: ActionKind) -> Document {
        doc! {
            "guild_id": guild_id as i64,
            "user_id": user_id as i64,
            "kind": kind.as_str(),
        }
    }

    /// Insert or replace the task for this (guild, target, kind) triple and
    /// return the stored record. The latest timed action always wins.
    pub async fn upsert(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: ActionKind,
        infraction_id: ObjectId,
        expires_at: i64,
    ) -> Result<ExpiryTask> {
        let task = ExpiryTask::new(guild_id, user_id, kind, infraction_id, expires_at);

        let options = mongodb::options::FindOneAndReplaceOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let stored = self
            .collection
            .find_one_and_replace(Self::key(guild_id, user_id, kind), &task)
            .with_options(options)
            .await?;
        let stored = stored.unwrap_or(task);

        debug!(
            "scheduled {} reversal for user {} in guild {} at {}",
            kind.as_str(),
            user_id,
            guild_id,
            expires_at
        );

        Ok(stored)
    }

    pub async fn find(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: ActionKind,
    ) -> Result<Option<ExpiryTask>> {
        Ok(self
            .collection
            .find_one(Self::key(guild_id, user_id, kind))
            .await?)
    }

    /// Delete the task for this triple if it exists.
    ///
    /// Absence is a normal outcome (the task may have fired already, or
    /// never existed); returns whether a record was removed.
    pub async fn delete(&self, guild_id: u64, user_id: u64, kind: ActionKind) -> Result<bool> {
        let result = self
            .collection
            .delete_one(Self::key(guild_id, user_id, kind))
            .await?;

        debug!(
            "delete {} task for user {} in guild {}: {}",
            kind.as_str(),
            user_id,
            guild_id,
            result.deleted_count > 0
        );

        Ok(result.deleted_count > 0)
    }

    /// Delete both task kinds for a target, returning how many existed.
    /// Used when a platform-level ban supersedes whatever was scheduled.
    pub async fn delete_all_for(&self, guild_id: u64, user_id: u64) -> Result<u64> {
        let filter = doc! {
            "guild_id": guild_id as i64,
            "user_id": user_id as i64,
        };
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    /// Tasks due at `now`, oldest first, bounded by `limit`.
    pub async fn due(&self, now: i64, limit: i64) -> Result<Vec<ExpiryTask>> {
        let filter = doc! { "expires_at": { "$lte": now } };

        let mut cursor = self
            .collection
            .find(filter)
            .sort(doc! { "expires_at": 1 })
            .limit(limit)
            .await?;

        let mut due = Vec::new();
        while let Some(task) = cursor.next().await {
            due.push(task?);
        }

        Ok(due)
    }
}
