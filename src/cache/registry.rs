//! Cache registry - one memo cache per owning component.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::MemoCache;

/// Central registry of named memo caches.
///
/// The name identifies the owner (a cog uses its config namespace), so two
/// owners never see each other's entries even when their keys are equal.
///
/// ```rust,ignore
/// let registry = CacheRegistry::new();
/// let configs: MemoCache<u64, Arc<CogConfig<LogSchema>>> =
///     registry.get_or_create("log");
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

/// Internal cache entry storing type-erased cache.
struct CacheEntry {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheEntry {
    fn downcast<K, V>(&self, name: &str) -> MemoCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        match self.cache.downcast_ref::<MemoCache<K, V>>() {
            Some(cache) => cache.clone(),
            None => panic!(
                "Cache '{}' type mismatch: expected {}, got {}",
                name,
                std::any::type_name::<MemoCache<K, V>>(),
                self.type_name
            ),
        }
    }
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        info!("Cache registry initialized");
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get an existing cache or register a new one.
    ///
    /// # Panics
    /// Panics if the cache exists with different key/value types.
    pub fn get_or_create<K, V>(&self, name: &str) -> MemoCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write();

        if let Some(existing) = caches.get(name) {
            return existing.downcast(name);
        }

        debug!("Creating cache: {}", name);
        let cache = MemoCache::<K, V>::new(name);

        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<MemoCache<K, V>>(),
                type_name: std::any::type_name::<MemoCache<K, V>>(),
            },
        );

        cache
    }

    /// Get a list of all registered cache names.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field(
                "caches",
                &caches
                    .iter()
                    .map(|(name, entry)| (name.as_str(), entry.type_id))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
