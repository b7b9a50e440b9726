use crate::catalog::{Activity, Category};
use crate::signal::PreferenceSignal;

/// Reorders filtered activities so categories earlier in the preference list
/// sort earlier. Activities whose category is absent from the list keep their
/// original relative order after all matched activities. Stable throughout;
/// an empty preference list is an order-preserving identity.
pub fn rank_by_preference(activities: Vec<Activity>, preferences: &[Category]) -> Vec<Activity> {
    if preferences.is_empty() {
        return activities;
    }
    let mut ranked = activities;
    ranked.sort_by_key(|activity| category_priority(activity.category, preferences));
    ranked
}

/// Ranks with whichever category list the signal carries. Both outcomes are
/// handled here so a degraded signal still produces an ordering.
pub fn apply_signal(activities: Vec<Activity>, signal: &PreferenceSignal) -> Vec<Activity> {
    match signal {
        PreferenceSignal::Inferred { categories }
        | PreferenceSignal::Fallback { categories, .. } => {
            rank_by_preference(activities, categories)
        }
    }
}

fn category_priority(category: Category, preferences: &[Category]) -> usize {
    preferences
        .iter()
        .position(|p| *p == category)
        .unwrap_or(preferences.len())
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Activity, Category, FatigueRange, Location};
    use crate::selection::ranker::{apply_signal, rank_by_preference};
    use crate::signal::{FallbackReason, PreferenceSignal};

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

    fn ids(activities: &[Activity]) -> Vec<i64> {
        activities.iter().map(|a| a.id).collect()
    }

    #[test]
    fn empty_preference_list_is_identity() {
        let input = vec![
            activity(1, Category::DeskWork),
            activity(2, Category::Relaxation),
        ];
        let ranked = rank_by_preference(input.clone(), &[]);
        assert_eq!(ids(&ranked), ids(&input));
    }

    #[test]
    fn preferred_categories_move_forward_ties_keep_order() {
        // [desk_work, relaxation, light_exercise, relaxation] ranked by
        // [relaxation, light_exercise] yields both relaxation entries first,
        // in their original relative order.
        let input = vec![
            activity(1, Category::DeskWork),
            activity(2, Category::Relaxation),
            activity(3, Category::LightExercise),
            activity(4, Category::Relaxation),
        ];
        let ranked =
            rank_by_preference(input, &[Category::Relaxation, Category::LightExercise]);
        assert_eq!(ids(&ranked), vec![2, 4, 3, 1]);
    }

    #[test]
    fn unmatched_activities_keep_relative_order_at_the_back() {
        let input = vec![
            activity(1, Category::ShortFocus),
            activity(2, Category::DeskWork),
            activity(3, Category::Relaxation),
            activity(4, Category::ShortFocus),
        ];
        let ranked = rank_by_preference(input, &[Category::Relaxation]);
        assert_eq!(ids(&ranked), vec![3, 1, 2, 4]);
    }

    #[test]
    fn ranking_is_idempotent_for_a_fixed_preference_list() {
        let preferences = [Category::LightExercise, Category::Relaxation];
        let input = vec![
            activity(1, Category::DeskWork),
            activity(2, Category::Relaxation),
            activity(3, Category::LightExercise),
        ];
        let once = rank_by_preference(input, &preferences);
        let twice = rank_by_preference(once.clone(), &preferences);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn fallback_signal_still_ranks() {
        let input = vec![
            activity(1, Category::DeskWork),
            activity(2, Category::Relaxation),
        ];
        let signal = PreferenceSignal::fallback(FallbackReason::GenerationFailed);
        let ranked = apply_signal(input, &signal);
        assert_eq!(ids(&ranked), vec![2, 1]);
    }
}
