use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::analytics::{self, AnalyticsSnapshot};
use crate::cache::{cache_key, CacheState};
use crate::error::CoreResult;
use crate::fetcher::DataFetcher;

/// Serves analytics snapshots with their own cache entry, so repeated
/// dashboard renders within the insight TTL skip both the record fetch and
/// the aggregation. Reads always go through the [`DataFetcher`] to share
/// its record cache; the same write-triggered invalidation clears both
/// layers.
#[derive(Clone)]
pub struct InsightGenerator {
    fetcher: DataFetcher,
    caches: CacheState,
    insight_ttl: Duration,
    aggregations: Arc<AtomicU64>,
}

impl InsightGenerator {
    pub fn new(fetcher: DataFetcher, caches: CacheState, insight_ttl: Duration) -> Self {
        Self {
            fetcher,
            caches,
            insight_ttl,
            aggregations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get_insights(&self, user_id: Uuid) -> CoreResult<AnalyticsSnapshot> {
        self.get_insights_as_of(user_id, Utc::now().date_naive())
            .await
    }

    /// `as_of` anchors "today" for the streak walk and trend window.
    pub async fn get_insights_as_of(
        &self,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> CoreResult<AnalyticsSnapshot> {
        // The anchor date is part of the key: snapshots for different
        // `as_of` dates never shadow one another within the TTL window.
        let key = cache_key(user_id, &format!("insights:{as_of}"));

        if let Some(snapshot) = self.caches.snapshots.get(&key).await {
            tracing::debug!(%user_id, "insight cache hit");
            return Ok(snapshot);
        }

        let data = self.fetcher.fetch_analytics_data(user_id).await?;
        let snapshot = analytics::snapshot(&data.mood_entries, as_of);
        self.aggregations.fetch_add(1, Ordering::Relaxed);

        self.caches
            .snapshots
            .set(&key, snapshot.clone(), self.insight_ttl)
            .await;

        Ok(snapshot)
    }

    /// Number of aggregation passes performed since construction. Lets
    /// callers (and tests) verify that cached snapshots are served without
    /// recomputation.
    pub fn aggregation_count(&self) -> u64 {
        self.aggregations.load(Ordering::Relaxed)
    }
}
