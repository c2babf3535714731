//! Async memoizing cache over Moka.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use moka::future::Cache;
use tracing::trace;

/// Memoizes the result of an async computation per key.
///
/// - Concurrent misses on one key run the computation once; every caller
///   awaits the same in-flight future and gets the same value.
/// - A failed computation is never stored, the next call retries.
/// - Nothing is evicted or expires; entries live until invalidated.
/// - Cloning is cheap and shares the underlying cache.
pub struct MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
    name: Arc<str>,
}

// Manual Clone implementation that doesn't require K: Clone
impl<K, V> Clone for MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an unbounded, non-expiring memo cache with the given name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        let name = name.into();

        Self {
            inner: Cache::builder().name(&name).build(),
            name,
        }
    }

    /// Return the cached value for `key` or compute it with `init`.
    ///
    /// Errors are shared between all callers waiting on the same computation,
    /// hence the `Arc`.
    pub async fn get_or_try_insert_with<F, E>(&self, key: K, init: F) -> Result<V, Arc<E>>
    where
        F: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        self.inner.try_get_with(key, init).await
    }

    /// Replace the entry for `key`.
    pub async fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    /// Drop the entry for `key`. Missing keys are ignored.
    pub async fn invalidate(&self, key: &K) {
        trace!(cache = %self.name, "invalidate");
        self.inner.invalidate(key).await;
    }
}

impl<K, V> std::fmt::Debug for MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("name", &self.name)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::join_all;

    use super::*;

    fn counted(calls: &AtomicUsize, value: u32) -> impl Future<Output = Result<u32, String>> + '_ {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        }
    }

    #[tokio::test]
    async fn test_second_get_hits_cache() {
        let cache = MemoCache::<u64, u32>::new("test");
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_try_insert_with(1, counted(&calls, 7)).await.unwrap();
        let second = cache.get_or_try_insert_with(1, counted(&calls, 8)).await.unwrap();

        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = MemoCache::<u64, u32>::new("test");
        let calls = AtomicUsize::new(0);

        cache.get_or_try_insert_with(1, counted(&calls, 7)).await.unwrap();
        cache.invalidate(&1).await;
        let value = cache.get_or_try_insert_with(1, counted(&calls, 9)).await.unwrap();

        assert_eq!(value, 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Invalidating a key that was never cached is a no-op.
        cache.invalidate(&42).await;
        assert_eq!(cache.get_or_try_insert_with(1, counted(&calls, 0)).await.unwrap(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = MemoCache::<u64, u32>::new("test");
        let calls = AtomicUsize::new(0);

        cache.get_or_try_insert_with(1, counted(&calls, 1)).await.unwrap();
        cache.get_or_try_insert_with(2, counted(&calls, 2)).await.unwrap();
        cache.invalidate(&1).await;

        assert_eq!(cache.get_or_try_insert_with(2, counted(&calls, 0)).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = MemoCache::<u64, u32>::new("test");

        let failed = cache
            .get_or_try_insert_with(1, async { Err::<u32, _>("store down".to_string()) })
            .await;
        assert_eq!(failed.unwrap_err().as_str(), "store down");

        let value = cache
            .get_or_try_insert_with(1, async { Ok::<_, String>(3) })
            .await
            .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_insert_replaces_entry() {
        let cache = MemoCache::<u64, u32>::new("test");
        let calls = AtomicUsize::new(0);

        cache.get_or_try_insert_with(1, counted(&calls, 7)).await.unwrap();
        cache.insert(1, 8).await;

        assert_eq!(cache.get_or_try_insert_with(1, counted(&calls, 9)).await.unwrap(), 8);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let cache = MemoCache::<u64, u32>::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let callers = (0..16).map(|_| {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .get_or_try_insert_with(5, async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, String>(99)
                    })
                    .await
                    .unwrap()
            }
        });

        let values = join_all(callers).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| *v == 99));
    }
}
