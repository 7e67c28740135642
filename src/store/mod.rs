use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{JournalEntry, MoodEntry};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Inclusive calendar-date range filter for record selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days`-day window ending at `end` (inclusive on both sides).
    pub fn last_days(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - chrono::Duration::days(days - 1),
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Gateway to the remote record store. Implementations are stateless in the
/// sense that all record ownership stays with the backend; this layer never
/// caches. Timeouts and retries are the implementation's concern.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Mood entries for one user, newest first.
    async fn select_mood_entries(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<MoodEntry>, StoreError>;

    /// Journal entries for one user, newest first.
    async fn select_journal_entries(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<JournalEntry>, StoreError>;

    async fn insert_mood_entry(&self, entry: &MoodEntry) -> Result<(), StoreError>;

    async fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), StoreError>;
}
