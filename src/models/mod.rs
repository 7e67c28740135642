pub mod journal_entry;
pub mod mood_entry;

pub use journal_entry::{CreateJournalEntry, JournalEntry};
pub use mood_entry::{CreateMoodEntry, MoodEntry, MoodLabel};

use serde::{Deserialize, Serialize};

/// Combined per-user fetch result. This is the unit of record caching: one
/// cache entry holds both record sets so a dashboard render needs one read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub mood_entries: Vec<MoodEntry>,
    pub journal_entries: Vec<JournalEntry>,
}
