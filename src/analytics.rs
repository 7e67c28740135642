//! Pure analytics over an in-memory mood entry set. No I/O, no clock reads:
//! callers pass the `as_of` date that anchors the trend window and streak
//! walk, which keeps every function deterministic under test.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{MoodEntry, MoodLabel};

/// One day of the 7-day trend. `average` is absent when nothing was logged
/// that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub average: Option<f64>,
}

/// Derived analytics for one user. Computed on demand, cached by the
/// insight generator, discarded on invalidation or TTL expiry. Never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub distribution: HashMap<MoodLabel, u64>,
    /// Exactly 7 points, oldest first, ending at the `as_of` date.
    pub weekly_trend: Vec<TrendPoint>,
    pub streak_days: u32,
    pub insights: Vec<String>,
}

/// Occurrence count per mood label.
pub fn mood_distribution(entries: &[MoodEntry]) -> HashMap<MoodLabel, u64> {
    let mut distribution = HashMap::new();
    for entry in entries {
        *distribution.entry(entry.mood).or_insert(0) += 1;
    }
    distribution
}

/// Mean mood score per day over the 7 days ending at `as_of`, rounded to
/// one decimal place.
pub fn weekly_trend(entries: &[MoodEntry], as_of: NaiveDate) -> Vec<TrendPoint> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = as_of - Duration::days(offset);
            let scores: Vec<f64> = entries
                .iter()
                .filter(|e| e.created_at.date_naive() == date)
                .map(|e| e.mood.score())
                .collect();

            let average = if scores.is_empty() {
                None
            } else {
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                Some((mean * 10.0).round() / 10.0)
            };

            TrendPoint { date, average }
        })
        .collect()
}

/// Consecutive days with at least one mood entry, walking backward from
/// `as_of`. An `as_of` day with no entries ends the streak immediately, so
/// a user who has not logged yet today reads a streak of zero even if they
/// logged every prior day.
pub fn current_streak(entries: &[MoodEntry], as_of: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = entries.iter().map(|e| e.created_at.date_naive()).collect();

    let mut streak = 0;
    let mut day = as_of;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Human-readable summary lines, in a fixed order: most frequent mood,
/// average energy, then the streak when one is active. Label ties go to the
/// label seen first in input order.
pub fn summary_insights(entries: &[MoodEntry], as_of: NaiveDate) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No mood entries yet. Log your first mood to start seeing insights!".into()];
    }

    let mut insights = Vec::new();

    let distribution = mood_distribution(entries);
    let max_count = distribution.values().copied().max().unwrap_or(0);
    if let Some(top_mood) = entries
        .iter()
        .map(|e| e.mood)
        .find(|mood| distribution[mood] == max_count)
    {
        insights.push(format!(
            "Your most frequent mood is {top_mood} ({max_count} entries)."
        ));
    }

    let avg_energy =
        entries.iter().map(|e| e.energy as f64).sum::<f64>() / entries.len() as f64;
    insights.push(format!("Average energy level: {avg_energy:.1}/10."));

    let streak = current_streak(entries, as_of);
    if streak > 0 {
        insights.push(format!(
            "You're on a {streak}-day logging streak. Keep it going!"
        ));
    }

    insights
}

pub fn snapshot(entries: &[MoodEntry], as_of: NaiveDate) -> AnalyticsSnapshot {
    AnalyticsSnapshot {
        distribution: mood_distribution(entries),
        weekly_trend: weekly_trend(entries, as_of),
        streak_days: current_streak(entries, as_of),
        insights: summary_insights(entries, as_of),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mood_on(date: NaiveDate, mood: MoodLabel, energy: i32) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mood,
            energy,
            notes: None,
            activities: vec![],
            created_at: date.and_hms_opt(12, 0, 0).unwrap().and_utc(),
        }
    }

    #[test]
    fn test_distribution_counts_every_entry() {
        let today = day(2026, 8, 23);
        let entries = vec![
            mood_on(today, MoodLabel::Excellent, 7),
            mood_on(today, MoodLabel::Excellent, 8),
            mood_on(today, MoodLabel::Good, 6),
        ];

        let distribution = mood_distribution(&entries);
        assert_eq!(distribution[&MoodLabel::Excellent], 2);
        assert_eq!(distribution[&MoodLabel::Good], 1);
        assert_eq!(distribution.values().sum::<u64>(), entries.len() as u64);
    }

    #[test]
    fn test_streak_stops_at_first_gap() {
        let today = day(2026, 8, 23);
        let entries = vec![
            mood_on(today, MoodLabel::Good, 5),
            mood_on(today - Duration::days(1), MoodLabel::Neutral, 5),
            // Gap on day 2.
            mood_on(today - Duration::days(3), MoodLabel::Good, 5),
        ];

        assert_eq!(current_streak(&entries, today), 2);
    }

    #[test]
    fn test_streak_is_zero_without_an_entry_today() {
        let today = day(2026, 8, 23);
        let entries = vec![
            mood_on(today - Duration::days(1), MoodLabel::Good, 5),
            mood_on(today - Duration::days(2), MoodLabel::Good, 5),
        ];

        assert_eq!(current_streak(&entries, today), 0, "no entry on as_of ends the streak");
    }

    #[test]
    fn test_streak_counts_multiple_entries_per_day_once() {
        let today = day(2026, 8, 23);
        let entries = vec![
            mood_on(today, MoodLabel::Good, 5),
            mood_on(today, MoodLabel::Bad, 3),
            mood_on(today - Duration::days(1), MoodLabel::Good, 5),
        ];

        assert_eq!(current_streak(&entries, today), 2);
    }

    #[test]
    fn test_weekly_trend_scores_today_and_leaves_other_days_absent() {
        let today = day(2026, 8, 23);
        let entries = vec![mood_on(today, MoodLabel::Good, 5)];

        let trend = weekly_trend(&entries, today);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, today - Duration::days(6), "oldest day first");
        assert_eq!(trend[6].date, today);
        assert_eq!(trend[6].average, Some(4.0));
        assert!(trend[..6].iter().all(|p| p.average.is_none()));
    }

    #[test]
    fn test_weekly_trend_averages_to_one_decimal() {
        let today = day(2026, 8, 23);
        // excellent (5) + good (4) + good (4) -> 13/3 = 4.333... -> 4.3
        let entries = vec![
            mood_on(today, MoodLabel::Excellent, 5),
            mood_on(today, MoodLabel::Good, 5),
            mood_on(today, MoodLabel::Good, 5),
        ];

        let trend = weekly_trend(&entries, today);
        assert_eq!(trend[6].average, Some(4.3));
    }

    #[test]
    fn test_insights_order_and_content() {
        let today = day(2026, 8, 23);
        let entries = vec![
            mood_on(today, MoodLabel::Good, 6),
            mood_on(today - Duration::days(1), MoodLabel::Good, 8),
            mood_on(today - Duration::days(1), MoodLabel::Bad, 4),
        ];

        let insights = summary_insights(&entries, today);
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0], "Your most frequent mood is good (2 entries).");
        assert_eq!(insights[1], "Average energy level: 6.0/10.");
        assert_eq!(insights[2], "You're on a 2-day logging streak. Keep it going!");
    }

    #[test]
    fn test_insights_placeholder_when_empty() {
        let insights = summary_insights(&[], day(2026, 8, 23));
        assert_eq!(insights.len(), 1);
        assert!(insights[0].contains("No mood entries yet"));
    }

    #[test]
    fn test_most_frequent_tie_goes_to_first_seen() {
        let today = day(2026, 8, 23);
        let entries = vec![
            mood_on(today, MoodLabel::Bad, 5),
            mood_on(today, MoodLabel::Excellent, 5),
            mood_on(today, MoodLabel::Excellent, 5),
            mood_on(today, MoodLabel::Bad, 5),
        ];

        let insights = summary_insights(&entries, today);
        assert_eq!(insights[0], "Your most frequent mood is bad (2 entries).");
    }

    #[test]
    fn test_unrecognized_label_parses_as_neutral() {
        assert_eq!(MoodLabel::parse("ecstatic"), MoodLabel::Neutral);
        assert_eq!(MoodLabel::parse("excellent"), MoodLabel::Excellent);
        assert_eq!(MoodLabel::Neutral.score(), 3.0);
    }

    #[test]
    fn test_snapshot_serializes_with_string_keyed_distribution() {
        let today = day(2026, 8, 23);
        let entries = vec![mood_on(today, MoodLabel::Terrible, 2)];

        let snapshot = snapshot(&entries, today);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["distribution"]["terrible"], 1);
        assert_eq!(json["streak_days"], 1);
    }
}
