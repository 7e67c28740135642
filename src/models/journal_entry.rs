use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MoodLabel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub mood: Option<MoodLabel>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJournalEntry {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub mood: Option<MoodLabel>,
    #[serde(default)]
    pub tags: Vec<String>,
}
