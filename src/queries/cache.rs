use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Ordered key segments, e.g. `["predictions", "pred-001"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

/// Keyed result cache with a fixed stale time.
///
/// Fresh entries are served without calling the fetcher. Mutations drop
/// entries by key prefix so the next read refetches.
pub struct QueryCache {
    stale_time: Duration,
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh cached value, if any. A type mismatch counts as a miss.
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() >= self.stale_time {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Store `value` under `key`. Stale entries are pruned on every insert so
    /// one-off keys (search text) do not accumulate.
    pub async fn insert<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.stale_time);
        let pruned = before - entries.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Query cache pruned stale entries");
        }

        entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                fetched_at: Instant::now(),
            },
        );
    }

    /// Serve from cache, or run `fetch` and cache a successful result.
    /// Failures are returned and not cached.
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(&key).await {
            metrics::counter!("query_cache_hits_total").increment(1);
            return Ok(hit);
        }

        metrics::counter!("query_cache_misses_total").increment(1);
        let value = fetch().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Drop every entry whose key starts with `prefix`.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        tracing::debug!(prefix = %prefix, removed, "Query cache invalidated");
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_prefix_matching() {
        let list = QueryKey::new(["predictions"]);
        let one = QueryKey::new(["predictions", "pred-001"]);
        let nft = QueryKey::new(["nftPredictions"]);

        assert!(one.starts_with(&list));
        assert!(list.starts_with(&list));
        assert!(!list.starts_with(&one));
        assert!(!nft.starts_with(&list));
        assert_eq!(one.to_string(), "[predictions, pred-001]");
    }

    #[tokio::test]
    async fn test_fresh_entries_skip_fetcher() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let key = QueryKey::new(["predictions"]);

        for _ in 0..3 {
            let v: Result<u32, Infallible> = cache
                .fetch(key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(v, Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let cache = QueryCache::new(Duration::ZERO);
        let key = QueryKey::new(["x"]);
        cache.insert(key.clone(), 1u32).await;
        assert_eq!(cache.get::<u32>(&key).await, None);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new(["predictions", "missing"]);

        let first: Result<u32, &str> = cache.fetch(key.clone(), || async { Err("boom") }).await;
        assert_eq!(first, Err("boom"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(QueryKey::new(["predictions"]), 1u32).await;
        cache.insert(QueryKey::new(["predictions", "a"]), 2u32).await;
        cache.insert(QueryKey::new(["nftPredictions"]), 3u32).await;

        let removed = cache.invalidate(&QueryKey::new(["predictions"])).await;
        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get::<u32>(&QueryKey::new(["nftPredictions"])).await, Some(3));
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_miss() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new(["k"]);
        cache.insert(key.clone(), 1u32).await;
        assert_eq!(cache.get::<String>(&key).await, None);
    }

    #[tokio::test]
    async fn test_stale_entries_are_pruned_on_insert() {
        let cache = QueryCache::new(Duration::from_millis(20));
        for query in ["ape", "punk", "bear"] {
            cache
                .insert(QueryKey::new(["nftSearch", query, ""]), vec![query.to_string()])
                .await;
        }
        assert_eq!(cache.len().await, 3);

        tokio::time::sleep(Duration::from_millis(40)).await;

        let key = QueryKey::new(["nftSearch", "doodle", ""]);
        cache.insert(key.clone(), vec!["doodle".to_string()]).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(
            cache.get::<Vec<String>>(&key).await,
            Some(vec!["doodle".to_string()])
        );
    }
}
