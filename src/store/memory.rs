use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{JournalEntry, MoodEntry};

use super::{DateRange, RecordStore, StoreError};

/// In-process record store for tests and demos.
///
/// Mirrors the Postgres contract (newest-first ordering, inclusive date
/// ranges) and counts select calls so callers can assert on cache and
/// coalescing behavior. Optional per-select latency simulates the remote
/// round trip.
#[derive(Default)]
pub struct MemoryRecordStore {
    moods: Mutex<HashMap<Uuid, Vec<MoodEntry>>>,
    journals: Mutex<HashMap<Uuid, Vec<JournalEntry>>>,
    selects: AtomicU64,
    latency: Option<Duration>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Total select calls served (mood and journal selects each count one).
    pub fn select_count(&self) -> u64 {
        self.selects.load(Ordering::Relaxed)
    }

    async fn before_select(&self) {
        self.selects.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn select_mood_entries(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<MoodEntry>, StoreError> {
        self.before_select().await;

        let moods = self.moods.lock().await;
        let mut entries: Vec<MoodEntry> = moods
            .get(&user_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| {
                        range.map_or(true, |r| r.contains(e.created_at.date_naive()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn select_journal_entries(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        self.before_select().await;

        let journals = self.journals.lock().await;
        let mut entries: Vec<JournalEntry> = journals
            .get(&user_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| {
                        range.map_or(true, |r| r.contains(e.created_at.date_naive()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn insert_mood_entry(&self, entry: &MoodEntry) -> Result<(), StoreError> {
        let mut moods = self.moods.lock().await;
        moods.entry(entry.user_id).or_default().push(entry.clone());
        Ok(())
    }

    async fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        let mut journals = self.journals.lock().await;
        journals
            .entry(entry.user_id)
            .or_default()
            .push(entry.clone());
        Ok(())
    }
}
