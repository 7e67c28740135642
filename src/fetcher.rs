use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::cache::{cache_key, CacheState, InflightEntry, InflightSender};
use crate::error::{CoreError, CoreResult};
use crate::models::UserData;
use crate::store::{DateRange, RecordStore};

/// Query shapes the fetcher caches separately per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryShape {
    /// Every record the user owns.
    AllRecords,
    /// The trailing window the analytics layer consumes.
    AnalyticsWindow,
}

impl QueryShape {
    fn name(self) -> &'static str {
        match self {
            Self::AllRecords => "all",
            Self::AnalyticsWindow => "analytics",
        }
    }
}

/// Cache-through reader over the record store.
///
/// Identical concurrent fetches coalesce onto one underlying load: the first
/// caller registers a broadcast channel in the in-flight registry before any
/// suspension point, later callers subscribe to it instead of issuing a
/// second remote read. Loads run in a spawned task, so they complete and
/// populate the cache even if the initiating caller stops awaiting.
#[derive(Clone)]
pub struct DataFetcher {
    store: Arc<dyn RecordStore>,
    caches: CacheState,
    record_ttl: Duration,
    window_days: i64,
}

impl DataFetcher {
    pub fn new(
        store: Arc<dyn RecordStore>,
        caches: CacheState,
        record_ttl: Duration,
        window_days: i64,
    ) -> Self {
        Self {
            store,
            caches,
            record_ttl,
            window_days,
        }
    }

    /// All mood and journal entries for one user.
    pub async fn fetch_user_data(&self, user_id: Uuid) -> CoreResult<UserData> {
        self.fetch(user_id, QueryShape::AllRecords).await
    }

    /// The trailing analytics window (last `window_days` days including
    /// today) for one user. Cached under its own key.
    pub async fn fetch_analytics_data(&self, user_id: Uuid) -> CoreResult<UserData> {
        self.fetch(user_id, QueryShape::AnalyticsWindow).await
    }

    async fn fetch(&self, user_id: Uuid, shape: QueryShape) -> CoreResult<UserData> {
        let key = cache_key(user_id, shape.name());

        if let Some(data) = self.caches.records.get(&key).await {
            tracing::debug!(%user_id, shape = shape.name(), "record cache hit");
            return Ok(data);
        }

        let mut rx = {
            let mut inflight = self.caches.inflight.lock().await;
            if let Some(entry) = inflight.get(&key) {
                tracing::debug!(%user_id, shape = shape.name(), "joining in-flight fetch");
                entry.tx.subscribe()
            } else {
                let (tx, rx) = broadcast::channel(1);
                let token = Uuid::new_v4();
                inflight.insert(
                    key.clone(),
                    InflightEntry {
                        tx: tx.clone(),
                        token,
                    },
                );
                self.spawn_load(user_id, shape, key, tx, token);
                rx
            }
        };

        match rx.recv().await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(message)) => Err(CoreError::FetchFailed(message)),
            // Sender dropped without a result; only happens if the load
            // task panicked.
            Err(_) => Err(CoreError::FetchFailed("fetch task aborted".into())),
        }
    }

    fn spawn_load(
        &self,
        user_id: Uuid,
        shape: QueryShape,
        key: String,
        tx: InflightSender,
        token: Uuid,
    ) {
        let fetcher = self.clone();
        tokio::spawn(async move {
            let range = match shape {
                QueryShape::AllRecords => None,
                QueryShape::AnalyticsWindow => Some(DateRange::last_days(
                    Utc::now().date_naive(),
                    fetcher.window_days,
                )),
            };

            let result = fetcher.load(user_id, range).await;

            // The cache write happens under the registry lock, and only if
            // this task's own registration is still present. An invalidation
            // that ran while the load was in flight has removed it, and a
            // newer fetch may have re-registered under the same key; a stale
            // task must neither cache its (pre-write) result nor pop that
            // newer entry. Waiters still get the result either way.
            {
                let mut inflight = fetcher.caches.inflight.lock().await;
                let own = matches!(inflight.get(&key), Some(entry) if entry.token == token);
                if own {
                    inflight.remove(&key);
                    if let Ok(data) = &result {
                        fetcher
                            .caches
                            .records
                            .set(&key, data.clone(), fetcher.record_ttl)
                            .await;
                    }
                }
            }

            if let Err(message) = &result {
                tracing::warn!(%user_id, shape = shape.name(), error = %message, "record fetch failed");
            }

            let _ = tx.send(result);
        });
    }

    async fn load(&self, user_id: Uuid, range: Option<DateRange>) -> Result<UserData, String> {
        let (mood_entries, journal_entries) = tokio::try_join!(
            self.store.select_mood_entries(user_id, range),
            self.store.select_journal_entries(user_id, range),
        )
        .map_err(|e| e.to_string())?;

        Ok(UserData {
            mood_entries,
            journal_entries,
        })
    }
}
