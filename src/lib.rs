//! Data-access and analytics core for a personal mood/journal tracker.
//!
//! The crate sits between a UI layer and a remote record store: reads go
//! through a per-user TTL cache with in-flight request coalescing, derived
//! analytics (mood distribution, weekly trend, streaks, summary insights)
//! are cached separately, and every successful write invalidates all cached
//! views for that user before the write returns, so an immediate re-read
//! never observes stale data.
//!
//! [`MoodArc`] is the entry point. Construct one per process or session
//! (clones share all cache state) over any [`RecordStore`] implementation:
//!
//! ```no_run
//! use std::sync::Arc;
//! use moodarc_core::{Config, CreateMoodEntry, MoodArc, MoodLabel, MemoryRecordStore};
//!
//! # async fn run(user_id: uuid::Uuid) -> moodarc_core::CoreResult<()> {
//! let arc = MoodArc::new(Arc::new(MemoryRecordStore::new()), &Config::default());
//! arc.log_mood(CreateMoodEntry {
//!     user_id,
//!     mood: MoodLabel::Good,
//!     energy: 7,
//!     notes: None,
//!     activities: vec!["running".into()],
//! })
//! .await?;
//! let snapshot = arc.insights(user_id).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod insights;
pub mod models;
pub mod store;

pub use analytics::{AnalyticsSnapshot, TrendPoint};
pub use cache::{CacheState, TtlCache};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use fetcher::DataFetcher;
pub use insights::InsightGenerator;
pub use models::{
    CreateJournalEntry, CreateMoodEntry, JournalEntry, MoodEntry, MoodLabel, UserData,
};
pub use store::{DateRange, MemoryRecordStore, PgRecordStore, RecordStore, StoreError};

/// The constructed core: owns the store handle, the shared cache state, the
/// fetcher, and the insight generator. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MoodArc {
    store: Arc<dyn RecordStore>,
    caches: CacheState,
    fetcher: DataFetcher,
    insights: InsightGenerator,
}

impl MoodArc {
    pub fn new(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        let caches = CacheState::new();
        let fetcher = DataFetcher::new(
            store.clone(),
            caches.clone(),
            config.record_cache_ttl(),
            config.analytics_window_days,
        );
        let insights =
            InsightGenerator::new(fetcher.clone(), caches.clone(), config.insight_cache_ttl());

        Self {
            store,
            caches,
            fetcher,
            insights,
        }
    }

    /// Connects to Postgres (running migrations) and builds the core on top.
    pub async fn connect(config: &Config) -> CoreResult<Self> {
        let store = PgRecordStore::connect(&config.database_url)
            .await
            .map_err(|e| CoreError::Internal(anyhow::anyhow!(e)))?;
        Ok(Self::new(Arc::new(store), config))
    }

    /// Records a mood entry. On success, every cached view for the user is
    /// invalidated before the entry is returned, so a read issued right
    /// after this call reflects the new entry. Failed writes do not
    /// invalidate.
    pub async fn log_mood(&self, req: CreateMoodEntry) -> CoreResult<MoodEntry> {
        if !(1..=10).contains(&req.energy) {
            return Err(CoreError::Validation(
                "Energy must be between 1 and 10".into(),
            ));
        }

        let entry = MoodEntry {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            mood: req.mood,
            energy: req.energy,
            notes: req.notes,
            activities: req.activities,
            created_at: Utc::now(),
        };

        self.store.insert_mood_entry(&entry).await.map_err(|e| {
            tracing::warn!(user_id = %entry.user_id, error = %e, "mood insert failed");
            CoreError::WriteFailed(e.to_string())
        })?;

        self.caches.invalidate_user(entry.user_id).await;
        Ok(entry)
    }

    /// Records a journal entry, running the same invalidation protocol as
    /// [`log_mood`](Self::log_mood).
    pub async fn add_journal_entry(&self, req: CreateJournalEntry) -> CoreResult<JournalEntry> {
        if req.title.trim().is_empty() {
            return Err(CoreError::Validation("Title must not be empty".into()));
        }

        let now = Utc::now();
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            title: req.title,
            body: req.body,
            mood: req.mood,
            tags: req.tags,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_journal_entry(&entry).await.map_err(|e| {
            tracing::warn!(user_id = %entry.user_id, error = %e, "journal insert failed");
            CoreError::WriteFailed(e.to_string())
        })?;

        self.caches.invalidate_user(entry.user_id).await;
        Ok(entry)
    }

    /// All records for one user, served through the record cache.
    pub async fn user_data(&self, user_id: Uuid) -> CoreResult<UserData> {
        self.fetcher.fetch_user_data(user_id).await
    }

    /// The trailing analytics window for one user.
    pub async fn analytics_data(&self, user_id: Uuid) -> CoreResult<UserData> {
        self.fetcher.fetch_analytics_data(user_id).await
    }

    /// Cached analytics snapshot for one user.
    pub async fn insights(&self, user_id: Uuid) -> CoreResult<AnalyticsSnapshot> {
        self.insights.get_insights(user_id).await
    }

    pub fn insight_generator(&self) -> &InsightGenerator {
        &self.insights
    }

    pub fn cache_state(&self) -> &CacheState {
        &self.caches
    }
}
