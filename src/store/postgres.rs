use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{JournalEntry, MoodEntry, MoodLabel};

use super::{DateRange, RecordStore, StoreError};

/// Postgres-backed record store.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Connects, runs migrations, and returns a ready store.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!("record store migrations applied");

        Ok(Self { pool })
    }

    /// Wraps an existing pool. Migrations are the caller's responsibility.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Mood labels are stored as plain text; MoodLabel::parse maps anything
// unrecognized to neutral instead of failing the whole select.
#[derive(FromRow)]
struct MoodRow {
    id: Uuid,
    user_id: Uuid,
    mood: String,
    energy: i32,
    notes: Option<String>,
    activities: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<MoodRow> for MoodEntry {
    fn from(row: MoodRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            mood: MoodLabel::parse(&row.mood),
            energy: row.energy,
            notes: row.notes,
            activities: row.activities,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct JournalRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    body: String,
    mood: Option<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JournalRow> for JournalEntry {
    fn from(row: JournalRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            body: row.body,
            mood: row.mood.as_deref().map(MoodLabel::parse),
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn select_mood_entries(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<MoodEntry>, StoreError> {
        let rows = if let Some(range) = range {
            sqlx::query_as::<_, MoodRow>(
                r#"
                SELECT * FROM mood_entries
                WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
                ORDER BY created_at DESC
                "#,
            )
            .bind(user_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MoodRow>(
                "SELECT * FROM mood_entries WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(MoodEntry::from).collect())
    }

    async fn select_journal_entries(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let rows = if let Some(range) = range {
            sqlx::query_as::<_, JournalRow>(
                r#"
                SELECT * FROM journal_entries
                WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
                ORDER BY created_at DESC
                "#,
            )
            .bind(user_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, JournalRow>(
                "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(JournalEntry::from).collect())
    }

    async fn insert_mood_entry(&self, entry: &MoodEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO mood_entries (id, user_id, mood, energy, notes, activities, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.mood.as_str())
        .bind(entry.energy)
        .bind(&entry.notes)
        .bind(&entry.activities)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO journal_entries (id, user_id, title, body, mood, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.title)
        .bind(&entry.body)
        .bind(entry.mood.map(MoodLabel::as_str))
        .bind(&entry.tags)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
