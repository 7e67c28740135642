use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::analytics::AnalyticsSnapshot;
use crate::models::UserData;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// In-memory key→value cache with per-entry TTL.
///
/// Expired entries are evicted lazily on access; there is no capacity bound
/// or background sweeper (single-user record sets stay small). Clones share
/// the same underlying map, so one instance per process/session is enough
/// and tests can construct their own for isolation.
pub struct TtlCache<V> {
    entries: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    /// Returns the cached value, or `None` if the key is missing or its
    /// age exceeds its TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Inserts or overwrites the entry for `key`.
    pub async fn set(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Removes a single entry. No-op if the key is absent.
    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
    }

    /// Removes every entry whose key starts with `prefix`.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.lock().await;
        entries.retain(|key, _| !key.starts_with(prefix));
    }
}

/// Cache key for one user's view of a given query shape.
pub(crate) fn cache_key(user_id: Uuid, shape: &str) -> String {
    format!("{user_id}:{shape}")
}

pub(crate) type InflightSender = broadcast::Sender<Result<UserData, String>>;

/// One registered in-flight load. The token ties a load task to its own
/// registration: after an invalidation, a newer fetch may re-register
/// under the same key, and the stale task must neither cache its result
/// nor displace that entry.
pub(crate) struct InflightEntry {
    pub(crate) tx: InflightSender,
    pub(crate) token: Uuid,
}

/// Shared cache registry: the record cache, the snapshot cache, and the
/// registry of in-flight fetches. The fetcher and insight generator hold
/// clones of the same state so one `invalidate_user` call clears every
/// cached view for that user.
#[derive(Clone, Default)]
pub struct CacheState {
    pub(crate) records: TtlCache<UserData>,
    pub(crate) snapshots: TtlCache<AnalyticsSnapshot>,
    pub(crate) inflight: Arc<Mutex<HashMap<String, InflightEntry>>>,
}

impl CacheState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every cached view and in-flight registration for one user.
    ///
    /// The in-flight registry is cleared first: a fetch that was already in
    /// flight when the write landed still completes for its waiters, but
    /// finds its registration gone and does not populate the cache, so a
    /// read issued right after the write can never pick up pre-write data.
    pub async fn invalidate_user(&self, user_id: Uuid) {
        let prefix = cache_key(user_id, "");
        {
            let mut inflight = self.inflight.lock().await;
            inflight.retain(|key, _| !key.starts_with(&prefix));
        }
        self.records.invalidate_prefix(&prefix).await;
        self.snapshots.invalidate_prefix(&prefix).await;
        tracing::info!(%user_id, "invalidated cached views");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_value_within_ttl() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("a", 1, Duration::from_secs(60)).await;
        assert_eq!(cache.get("a").await, Some(1));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("a", 1, Duration::ZERO).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get("a").await, None, "entry past its TTL should read as absent");
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_entry() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("a", 1, Duration::from_secs(60)).await;
        cache.set("a", 2, Duration::from_secs(60)).await;
        assert_eq!(cache.get("a").await, Some(2));
    }

    #[tokio::test]
    async fn test_invalidate_absent_key_is_noop() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.invalidate("missing").await;
        cache.set("a", 1, Duration::from_secs(60)).await;
        cache.invalidate("missing").await;
        assert_eq!(cache.get("a").await, Some(1), "unrelated entries should survive");
    }

    #[tokio::test]
    async fn test_invalidate_prefix_scopes_to_one_user() {
        let cache: TtlCache<i32> = TtlCache::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        cache.set(&cache_key(alice, "all"), 1, Duration::from_secs(60)).await;
        cache.set(&cache_key(alice, "analytics"), 2, Duration::from_secs(60)).await;
        cache.set(&cache_key(bob, "all"), 3, Duration::from_secs(60)).await;

        cache.invalidate_prefix(&cache_key(alice, "")).await;

        assert_eq!(cache.get(&cache_key(alice, "all")).await, None);
        assert_eq!(cache.get(&cache_key(alice, "analytics")).await, None);
        assert_eq!(cache.get(&cache_key(bob, "all")).await, Some(3), "other users must be untouched");
    }
}
