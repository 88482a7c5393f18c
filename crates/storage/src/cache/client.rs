use std::future::Future;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::{CacheStore, KeyTtl, MemoryCacheStore};
use crate::cache_key::CacheTtl;

/// Lenient front for a [`CacheStore`].
///
/// Store failures never reach callers: reads degrade to a miss and writes
/// report `false`, so a broken cache only costs extra upstream requests.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn CacheStore>,
}

impl CacheClient {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()))
    }

    pub async fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(data) => {
                    debug!("Cache hit: {}", key);
                    Some(data)
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn set_cached<T: Serialize>(&self, key: &str, data: &T, ttl: CacheTtl) -> bool {
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                warn!("Cannot serialize cache entry {}: {}", key, e);
                return false;
            }
        };

        match self.store.set(key, &value, ttl.duration()).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache write failed for {}: {}", key, e);
                false
            }
        }
    }

    pub async fn delete_cached(&self, key: &str) -> bool {
        self.store.delete(key).await.unwrap_or_else(|e| {
            warn!("Cache delete failed for {}: {}", key, e);
            false
        })
    }

    pub async fn key_exists(&self, key: &str) -> bool {
        self.store.exists(key).await.unwrap_or_else(|e| {
            warn!("Cache exists check failed for {}: {}", key, e);
            false
        })
    }

    pub async fn key_ttl(&self, key: &str) -> KeyTtl {
        self.store.ttl(key).await.unwrap_or_else(|e| {
            warn!("Cache ttl lookup failed for {}: {}", key, e);
            KeyTtl::Missing
        })
    }

    /// Cache-aside read: serve `key` if present, otherwise run `fetch` and
    /// store its result under `ttl`. Fetch errors pass through untouched and
    /// are never cached.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: CacheTtl,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get_cached(key).await {
            return Ok(hit);
        }

        let fresh = fetch().await?;
        self.set_cached(key, &fresh, ttl).await;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::cache::MockCacheStore;
    use crate::error::CacheError;

    fn failing_store() -> MockCacheStore {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .returning(|_| Err(CacheError::Store("connection refused".into())));
        store
            .expect_set()
            .returning(|_, _, _| Err(CacheError::Store("connection refused".into())));
        store
            .expect_delete()
            .returning(|_| Err(CacheError::Store("connection refused".into())));
        store
            .expect_exists()
            .returning(|_| Err(CacheError::Store("connection refused".into())));
        store
            .expect_ttl()
            .returning(|_| Err(CacheError::Store("connection refused".into())));
        store
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = CacheClient::in_memory();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..2 {
            let value: Result<Vec<u32>, String> = cache
                .get_or_fetch("coingecko:coins/markets", CacheTtl::Short, || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_triggers_refetch() {
        let cache = CacheClient::in_memory();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(json!({"usd": 1.0}))
        };

        cache.get_or_fetch("k", CacheTtl::Short, fetch).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        cache.get_or_fetch("k", CacheTtl::Short, fetch).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_errors_are_not_cached() {
        let cache = CacheClient::in_memory();

        let first: Result<u32, &str> = cache
            .get_or_fetch("k", CacheTtl::Short, || async { Err("upstream down") })
            .await;
        assert_eq!(first, Err("upstream down"));
        assert!(!cache.key_exists("k").await);

        let second: Result<u32, &str> = cache
            .get_or_fetch("k", CacheTtl::Short, || async { Ok(7) })
            .await;
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn test_broken_store_degrades_to_miss() {
        let cache = CacheClient::new(Arc::new(failing_store()));

        assert_eq!(cache.get_cached::<u32>("k").await, None);
        assert!(!cache.set_cached("k", &1u32, CacheTtl::Short).await);
        assert!(!cache.delete_cached("k").await);
        assert!(!cache.key_exists("k").await);
        assert_eq!(cache.key_ttl("k").await, KeyTtl::Missing);

        let value: Result<u32, String> = cache
            .get_or_fetch("k", CacheTtl::Short, || async { Ok(5) })
            .await;
        assert_eq!(value.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_treated_as_miss() {
        let cache = CacheClient::in_memory();
        assert!(cache.set_cached("k", &json!({"not": "a list"}), CacheTtl::Short).await);
        assert_eq!(cache.get_cached::<Vec<u32>>("k").await, None);
    }

    #[tokio::test]
    async fn test_round_trip_reports_ttl() {
        let cache = CacheClient::in_memory();
        assert!(cache.set_cached("k", &"v", CacheTtl::Medium).await);
        assert_eq!(cache.get_cached::<String>("k").await.as_deref(), Some("v"));
        assert!(matches!(
            cache.key_ttl("k").await,
            KeyTtl::Expires(d) if d <= Duration::from_secs(900)
        ));
        assert!(cache.delete_cached("k").await);
        assert_eq!(cache.key_ttl("k").await, KeyTtl::Missing);
    }
}
