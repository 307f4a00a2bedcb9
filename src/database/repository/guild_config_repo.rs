//! Guild configuration repository.
//!
//! The read path is cached; the write path keeps the cache honest by
//! evicting the entry before the write becomes visible, so a concurrent
//! reader can at worst re-load the old document and never keeps serving it
//! after the write completes.

use anyhow::Result;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::debug;

use crate::database::Database;
use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::models::{Capability, GuildConfig, ReasonPolicy, ReviewFamily, now_ts};

/// Repository for per-guild configuration.
pub struct GuildConfigRepo {
    collection: Collection<GuildConfig>,
    cache: TypedCache<u64, GuildConfig>,
}

impl GuildConfigRepo {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        Self {
            collection: db.collection("guild_configs"),
            cache: cache.get_or_create("guild_configs", CacheConfig::guild_config()),
        }
    }

    /// Get a guild's configuration, creating a default record if none
    /// exists yet.
    ///
    /// Concurrent misses may each load from the store; loads are idempotent
    /// reads, so the duplication is waste, not a hazard.
    pub async fn get(&self, guild_id: u64) -> Result<GuildConfig> {
        if let Some(config) = self.cache.get(&guild_id) {
            return Ok(config);
        }

        if let Some(config) = self.load(guild_id).await? {
            self.cache.insert(guild_id, config.clone());
            return Ok(config);
        }

        let config = GuildConfig::new(guild_id);
        self.write(&config).await?;
        self.cache.insert(guild_id, config.clone());
        debug!("created default config for guild {}", guild_id);

        Ok(config)
    }

    async fn load(&self, guild_id: u64) -> Result<Option<GuildConfig>> {
        let filter = doc! { "guild_id": guild_id as i64 };
        let config = self.collection.find_one(filter).await?;
        debug!("db get guild config {}: {}", guild_id, config.is_some());
        Ok(config)
    }

    /// Persist a configuration (upsert).
    ///
    /// Eviction happens first: after the write is visible no reader can
    /// still be handed the pre-write copy from cache.
    pub async fn save(&self, config: &mut GuildConfig) -> Result<()> {
        config.updated_at = now_ts();

        self.cache.invalidate(&config.guild_id);
        self.write(config).await?;
        debug!("saved config for guild {}", config.guild_id);

        Ok(())
    }

    async fn write(&self, config: &GuildConfig) -> Result<()> {
        let filter = doc! { "guild_id": config.guild_id as i64 };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(filter, config)
            .with_options(options)
            .await?;

        Ok(())
    }

    /// Grant a capability to a principal. Returns false if already granted.
    pub async fn grant(
        &self,
        guild_id: u64,
        principal: u64,
        capability: Capability,
    ) -> Result<bool> {
        let mut config = self.get(guild_id).await?;
        if !config.grant(principal, capability) {
            return Ok(false);
        }
        self.save(&mut config).await?;
        Ok(true)
    }

    /// Revoke a capability from a principal. Returns false if not granted.
    pub async fn revoke(
        &self,
        guild_id: u64,
        principal: u64,
        capability: Capability,
    ) -> Result<bool> {
        let mut config = self.get(guild_id).await?;
        if !config.revoke(principal, capability) {
            return Ok(false);
        }
        self.save(&mut config).await?;
        Ok(true)
    }

    /// Replace the reason policy for one entity family.
    pub async fn set_reason_policy(
        &self,
        guild_id: u64,
        family: ReviewFamily,
        policy: ReasonPolicy,
    ) -> Result<()> {
        let mut config = self.get(guild_id).await?;
        match family {
            ReviewFamily::Report => config.report_reasons = policy,
            ReviewFamily::Request => config.request_reasons = policy,
        }
        self.save(&mut config).await
    }

    /// Update the cached guild title.
    pub async fn set_title(&self, guild_id: u64, title: &str) -> Result<()> {
        let mut config = self.get(guild_id).await?;
        config.title = Some(title.to_string());
        self.save(&mut config).await
    }

    /// Evict a guild's entry. No-op if absent; never errors.
    pub fn invalidate(&self, guild_id: u64) {
        self.cache.invalidate(&guild_id);
    }

    /// Clear the whole cache (administrative/testing use).
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
