use std::collections::BTreeMap;

use tracing::warn;

use crate::catalog::{Activity, Category};
use crate::feedback::{CategoryPreference, CompletionStatus, FeedbackRecord, FeedbackSummary};

/// Only feedback rated at or above this counts toward category preferences.
/// A product constant; do not re-derive.
pub const HIGH_RATING_THRESHOLD: u8 = 7;

/// Window of each half of the rating-trend comparison.
const TREND_WINDOW: usize = 5;

/// Computes the per-user feedback summary from a newest-first history.
///
/// Feedback referencing an activity missing from the catalog is excluded from
/// the category tally (warned, not fatal) but still counts toward totals,
/// completion rate and trend.
pub fn summarize(records: &[FeedbackRecord], catalog: &[Activity]) -> FeedbackSummary {
    if records.is_empty() {
        return FeedbackSummary::empty();
    }

    let total = records.len();
    let rating_sum: u32 = records.iter().map(|r| u32::from(r.rating)).sum();
    let average_rating = round1(f64::from(rating_sum) / total as f64);

    let completed = records
        .iter()
        .filter(|r| r.completion_status == CompletionStatus::Completed)
        .count();
    let completion_rate = round1(completed as f64 / total as f64 * 100.0);

    let most_used_category = most_frequent_category(records, catalog);
    let improvement_trend = round1(rating_trend(records));

    FeedbackSummary {
        total_feedbacks: total,
        average_rating,
        completion_rate,
        most_used_category,
        improvement_trend,
    }
}

/// Categories the user rated highly, ordered by average rating then count,
/// both descending, truncated to `limit`.
pub fn category_preferences(
    records: &[FeedbackRecord],
    catalog: &[Activity],
    limit: usize,
) -> Vec<CategoryPreference> {
    let mut stats: BTreeMap<Category, (u32, usize)> = BTreeMap::new();
    for record in records {
        if record.rating < HIGH_RATING_THRESHOLD {
            continue;
        }
        let Some(category) = category_of(record, catalog) else {
            continue;
        };
        let entry = stats.entry(category).or_insert((0, 0));
        entry.0 += u32::from(record.rating);
        entry.1 += 1;
    }

    let mut preferences: Vec<CategoryPreference> = stats
        .into_iter()
        .map(|(category, (sum, count))| CategoryPreference {
            category,
            average_rating: f64::from(sum) / count as f64,
            count,
        })
        .collect();
    preferences.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then(b.count.cmp(&a.count))
    });
    preferences.truncate(limit);
    preferences
}

fn most_frequent_category(records: &[FeedbackRecord], catalog: &[Activity]) -> Option<Category> {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for record in records {
        if let Some(category) = category_of(record, catalog) {
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(category, _)| category)
}

fn category_of(record: &FeedbackRecord, catalog: &[Activity]) -> Option<Category> {
    let found = catalog
        .iter()
        .find(|a| a.id == record.activity_id)
        .map(|a| a.category);
    if found.is_none() {
        warn!(
            feedback_id = record.id,
            activity_id = record.activity_id,
            "feedback references an activity missing from the catalog"
        );
    }
    found
}

/// Average of the newest `TREND_WINDOW` ratings minus the average of the
/// preceding window. Zero when no older records exist.
fn rating_trend(records: &[FeedbackRecord]) -> f64 {
    let recent: Vec<u8> = records.iter().take(TREND_WINDOW).map(|r| r.rating).collect();
    let older: Vec<u8> = records
        .iter()
        .skip(TREND_WINDOW)
        .take(TREND_WINDOW)
        .map(|r| r.rating)
        .collect();
    if older.is_empty() {
        return 0.0;
    }
    mean(&recent) - mean(&older)
}

fn mean(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
    f64::from(sum) / ratings.len() as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::catalog::{Activity, Category, FatigueRange, Location};
    use crate::feedback::summary::{category_preferences, summarize};
    use crate::feedback::{CompletionStatus, FeedbackRecord, FeedbackSummary};

    fn activity(id: i64, category: Category) -> Activity {
        Activity {
            id,
            title: format!("activity {id}"),
            description: "test fixture".to_string(),
            category,
            duration: 20,
            locations: vec![Location::Home],
            fatigue_range: FatigueRange::new(1, 10),
            steps: Vec::new(),
            benefits: Vec::new(),
            image_url: None,
            scientific_basis: None,
        }
    }

    /// Newest-first records: index 0 is the most recent.
    fn records(
        entries: &[(i64, u8, CompletionStatus)],
        activity_id: i64,
    ) -> Vec<FeedbackRecord> {
        entries
            .iter()
            .enumerate()
            .map(|(idx, (id, rating, status))| FeedbackRecord {
                id: *id,
                user_id: 1,
                activity_id,
                rating: *rating,
                fatigue_level: 5,
                location: Location::Home,
                duration: 20,
                completion_status: *status,
                comments: None,
                created_at: Utc::now() - Duration::minutes(idx as i64),
            })
            .collect()
    }

    #[test]
    fn empty_history_gives_zeroed_summary() {
        let summary = summarize(&[], &[activity(1, Category::Relaxation)]);
        assert_eq!(summary, FeedbackSummary::empty());
    }

    #[test]
    fn three_completed_ratings_average_and_no_trend() {
        let catalog = vec![activity(1, Category::Relaxation)];
        let history = records(
            &[
                (1, 8, CompletionStatus::Completed),
                (2, 6, CompletionStatus::Completed),
                (3, 10, CompletionStatus::Completed),
            ],
            1,
        );
        let summary = summarize(&history, &catalog);
        assert_eq!(summary.total_feedbacks, 3);
        assert!((summary.average_rating - 8.0).abs() < f64::EPSILON);
        assert!((summary.completion_rate - 100.0).abs() < f64::EPSILON);
        assert_eq!(summary.most_used_category, Some(Category::Relaxation));
        assert!((summary.improvement_trend - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn completion_rate_counts_only_completed() {
        let catalog = vec![activity(1, Category::DeskWork)];
        let history = records(
            &[
                (1, 8, CompletionStatus::Completed),
                (2, 6, CompletionStatus::Partial),
                (3, 5, CompletionStatus::Abandoned),
            ],
            1,
        );
        let summary = summarize(&history, &catalog);
        assert!((summary.completion_rate - 33.3).abs() < 1e-9);
    }

    #[test]
    fn trend_compares_recent_five_against_preceding() {
        let catalog = vec![activity(1, Category::Relaxation)];
        // Newest five rated 8, the five before rated 6: trend +2.0.
        let entries: Vec<(i64, u8, CompletionStatus)> = (0..10)
            .map(|i| {
                let rating = if i < 5 { 8 } else { 6 };
                (i64::from(i) + 1, rating, CompletionStatus::Completed)
            })
            .collect();
        let summary = summarize(&records(&entries, 1), &catalog);
        assert!((summary.improvement_trend - 2.0).abs() < 1e-9);
    }

    #[test]
    fn feedback_for_missing_activity_counts_toward_totals_not_categories() {
        let catalog = vec![activity(1, Category::Relaxation)];
        let mut history = records(&[(1, 9, CompletionStatus::Completed)], 1);
        history.extend(records(&[(2, 7, CompletionStatus::Completed)], 999));
        let summary = summarize(&history, &catalog);
        assert_eq!(summary.total_feedbacks, 2);
        assert_eq!(summary.most_used_category, Some(Category::Relaxation));
    }

    #[test]
    fn preferences_require_high_ratings_and_sort_by_average_then_count() {
        let catalog = vec![
            activity(1, Category::Relaxation),
            activity(2, Category::DeskWork),
            activity(3, Category::LightExercise),
        ];
        let mut history = records(
            &[
                (1, 8, CompletionStatus::Completed),
                (2, 8, CompletionStatus::Completed),
            ],
            1,
        );
        history.extend(records(&[(3, 9, CompletionStatus::Completed)], 2));
        // Below threshold, must not appear.
        history.extend(records(&[(4, 6, CompletionStatus::Completed)], 3));

        let prefs = category_preferences(&history, &catalog, 10);
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs[0].category, Category::DeskWork);
        assert!((prefs[0].average_rating - 9.0).abs() < f64::EPSILON);
        assert_eq!(prefs[1].category, Category::Relaxation);
        assert_eq!(prefs[1].count, 2);
    }

    #[test]
    fn preferences_honor_the_limit() {
        let catalog = vec![
            activity(1, Category::Relaxation),
            activity(2, Category::DeskWork),
        ];
        let mut history = records(&[(1, 9, CompletionStatus::Completed)], 1);
        history.extend(records(&[(2, 8, CompletionStatus::Completed)], 2));
        let prefs = category_preferences(&history, &catalog, 1);
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].category, Category::Relaxation);
    }
}
