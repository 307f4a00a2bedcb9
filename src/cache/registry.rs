//! Cache registry - central management for all caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{CacheConfig, TypedCache};

/// Central registry for the process's typed caches.
///
/// Repositories create and look up their caches by name, so two components
/// asking for the same name share one cache and administrative code can
/// enumerate what exists.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

/// Internal type-erased entry.
struct CacheEntry {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an existing cache or create it.
    ///
    /// This is the entry point repositories use.
    ///
    /// # Panics
    /// Panics if a cache with the same name but different key/value types
    /// already exists; that is a wiring bug, not a runtime condition.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write();

        if let Some(existing) = caches.get(name) {
            if existing.type_id != TypeId::of::<TypedCache<K, V>>() {
                panic!(
                    "cache '{}' already registered with different types: expected {}, got {}",
                    name,
                    std::any::type_name::<TypedCache<K, V>>(),
                    existing.type_name
                );
            }
            return existing
                .cache
                .downcast_ref::<TypedCache<K, V>>()
                .unwrap()
                .clone();
        }

        debug!("creating cache: {}", name);
        let cache = TypedCache::new(name, config);

        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );

        cache
    }

    /// Number of registered caches.
    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    /// Whether no caches have been registered yet.
    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }

    /// Names of all registered caches.
    pub fn cache_names(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_returns_shared_cache() {
        let registry = CacheRegistry::new();

        let a: TypedCache<u64, String> = registry.get_or_create("shared", CacheConfig::default());
        a.insert(7, "seven".into());

        let b: TypedCache<u64, String> = registry.get_or_create("shared", CacheConfig::default());
        assert_eq!(b.get(&7), Some("seven".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[should_panic(expected = "different types")]
    fn type_mismatch_panics() {
        let registry = CacheRegistry::new();
        let _: TypedCache<u64, String> = registry.get_or_create("x", CacheConfig::default());
        let _: TypedCache<u64, u64> = registry.get_or_create("x", CacheConfig::default());
    }
}
