use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed set of mood labels a mood entry can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Excellent,
    Good,
    Neutral,
    Bad,
    Terrible,
}

impl MoodLabel {
    /// Score used by the analytics layer (excellent=5 down to terrible=1).
    pub fn score(self) -> f64 {
        match self {
            Self::Excellent => 5.0,
            Self::Good => 4.0,
            Self::Neutral => 3.0,
            Self::Bad => 2.0,
            Self::Terrible => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Neutral => "neutral",
            Self::Bad => "bad",
            Self::Terrible => "terrible",
        }
    }

    /// Parses a stored label. Unrecognized values fall back to `Neutral`
    /// so old or hand-edited rows never break analytics.
    pub fn parse(s: &str) -> Self {
        match s {
            "excellent" => Self::Excellent,
            "good" => Self::Good,
            "bad" => Self::Bad,
            "terrible" => Self::Terrible,
            _ => Self::Neutral,
        }
    }
}

impl std::fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mood log. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: MoodLabel,
    /// Energy level on a 1-10 scale.
    pub energy: i32,
    pub notes: Option<String>,
    pub activities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMoodEntry {
    pub user_id: Uuid,
    pub mood: MoodLabel,
    pub energy: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}
