use tracing::warn;

use crate::catalog::Activity;
use crate::selection::ConstraintQuery;

/// Applies the hard eligibility rules to a catalog snapshot.
///
/// Pure and stable: the output keeps catalog iteration order, and an empty
/// result is a normal outcome, not an error. Activities with an inverted
/// fatigue range are skipped with a warning instead of failing the pass.
pub fn filter_activities(catalog: &[Activity], query: &ConstraintQuery) -> Vec<Activity> {
    let max_duration = query.max_duration();
    catalog
        .iter()
        .filter(|activity| {
            if !activity.fatigue_range.is_valid() {
                warn!(
                    activity_id = activity.id,
                    min = activity.fatigue_range.min,
                    max = activity.fatigue_range.max,
                    "skipping activity with invalid fatigue range"
                );
                return false;
            }
            if !activity.fatigue_range.contains(query.fatigue_level) {
                return false;
            }
            if f64::from(activity.duration) > max_duration {
                return false;
            }
            if !activity.available_at(query.location) {
                return false;
            }
            match query.category {
                Some(category) => activity.category == category,
                None => true,
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Activity, Category, FatigueRange, Location};
    use crate::selection::filter::filter_activities;
    use crate::selection::ConstraintQuery;

    fn activity(id: i64, category: Category, duration: u32, range: (u8, u8)) -> Activity {
        Activity {
            id,
            title: format!("activity {id}"),
            description: "test fixture".to_string(),
            category,
            duration,
            locations: vec![Location::Home],
            fatigue_range: FatigueRange::new(range.0, range.1),
            steps: Vec::new(),
            benefits: Vec::new(),
            image_url: None,
            scientific_basis: None,
        }
    }

    fn home_query(fatigue_level: u8, duration: u32) -> ConstraintQuery {
        ConstraintQuery {
            fatigue_level,
            location: Location::Home,
            duration,
            category: None,
        }
    }

    #[test]
    fn fatigue_window_is_inclusive_on_both_ends() {
        let catalog = vec![activity(1, Category::Relaxation, 15, (3, 7))];
        assert_eq!(filter_activities(&catalog, &home_query(3, 30)).len(), 1);
        assert_eq!(filter_activities(&catalog, &home_query(7, 30)).len(), 1);
        assert!(filter_activities(&catalog, &home_query(2, 30)).is_empty());
        assert!(filter_activities(&catalog, &home_query(8, 30)).is_empty());
    }

    #[test]
    fn duration_tolerance_includes_the_exact_threshold() {
        // 30 minutes requested allows up to 37.5; a 37-minute activity passes,
        // a 38-minute one does not.
        let catalog = vec![
            activity(1, Category::Relaxation, 37, (1, 10)),
            activity(2, Category::Relaxation, 38, (1, 10)),
        ];
        let kept = filter_activities(&catalog, &home_query(5, 30));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn location_must_be_listed() {
        let mut office_only = activity(1, Category::DeskWork, 20, (1, 10));
        office_only.locations = vec![Location::Office];
        let catalog = vec![office_only, activity(2, Category::DeskWork, 20, (1, 10))];
        let kept = filter_activities(&catalog, &home_query(5, 30));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn optional_category_filter_is_exact() {
        let catalog = vec![
            activity(1, Category::Relaxation, 20, (1, 10)),
            activity(2, Category::DeskWork, 20, (1, 10)),
        ];
        let mut query = home_query(5, 30);
        query.category = Some(Category::DeskWork);
        let kept = filter_activities(&catalog, &query);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn filter_is_stable_and_repeatable() {
        let catalog = vec![
            activity(3, Category::Relaxation, 20, (1, 10)),
            activity(1, Category::DeskWork, 20, (1, 10)),
            activity(2, Category::Relaxation, 20, (1, 10)),
        ];
        let first = filter_activities(&catalog, &home_query(5, 30));
        let second = filter_activities(&catalog, &home_query(5, 30));
        let ids: Vec<i64> = first.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(
            ids,
            second.iter().map(|a| a.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn inverted_fatigue_range_is_skipped_not_fatal() {
        let catalog = vec![
            activity(1, Category::Relaxation, 20, (9, 2)),
            activity(2, Category::Relaxation, 20, (1, 10)),
        ];
        let kept = filter_activities(&catalog, &home_query(5, 30));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn no_match_returns_empty_not_error() {
        let catalog = vec![activity(1, Category::Relaxation, 60, (1, 10))];
        assert!(filter_activities(&catalog, &home_query(5, 15)).is_empty());
    }
}
