//! Infraction repository.

use anyhow::{Context, Result};
use futures::StreamExt;
use mongodb::Collection;
use mongodb::bson::{doc, oid::ObjectId};

use crate::database::Database;
use crate::database::models::Infraction;

/// Repository for recorded punitive actions.
pub struct InfractionRepo {
    collection: Collection<Infraction>,
}

impl InfractionRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("infractions"),
        }
    }

    /// Record an infraction, returning its id.
    pub async fn insert(&self, infraction: &Infraction) -> Result<ObjectId> {
        let result = self.collection.insert_one(infraction).await?;
        result
            .inserted_id
            .as_object_id()
            .context("inserted infraction has no ObjectId")
    }

    /// Moderation history for a target in a guild, newest first.
    pub async fn for_target(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: i64,
    ) -> Result<Vec<Infraction>> {
        let filter = doc! {
            "guild_id": guild_id as i64,
            "user_id": user_id as i64,
        };

        let mut cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?;

        let mut infractions = Vec::new();
        while let Some(infraction) = cursor.next().await {
            infractions.push(infraction?);
        }

        Ok(infractions)
    }
}
