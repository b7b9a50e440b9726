use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::{Activity, Category, FatigueRange, InMemoryCatalog, Location};

/// Loads a catalog from a JSON file containing an array of activities.
pub fn load_catalog(path: &Path) -> Result<InMemoryCatalog> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading catalog file: {}", path.display()))?;
    let activities: Vec<Activity> = serde_json::from_str(&data)
        .with_context(|| format!("invalid catalog JSON: {}", path.display()))?;
    Ok(InMemoryCatalog::new(activities))
}

/// Built-in starter catalog used when no catalog file is configured.
pub fn builtin_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        Activity {
            id: 1,
            title: "Box breathing".to_string(),
            description: "Slow four-count breathing cycle to settle the nervous system"
                .to_string(),
            category: Category::Relaxation,
            duration: 15,
            locations: vec![
                Location::Home,
                Location::Office,
                Location::Cafe,
                Location::Commuting,
                Location::Other,
            ],
            fatigue_range: FatigueRange::new(4, 10),
            steps: vec![
                "Inhale for four counts".to_string(),
                "Hold for four counts".to_string(),
                "Exhale for four counts".to_string(),
                "Hold empty for four counts, repeat".to_string(),
            ],
            benefits: vec!["Lowers heart rate".to_string(), "Reduces stress".to_string()],
            image_url: None,
            scientific_basis: Some(
                "Paced breathing increases parasympathetic activation".to_string(),
            ),
        },
        Activity {
            id: 2,
            title: "Desk stretch circuit".to_string(),
            description: "Neck, shoulder and wrist stretches done without leaving the chair"
                .to_string(),
            category: Category::LightExercise,
            duration: 15,
            locations: vec![Location::Home, Location::Office],
            fatigue_range: FatigueRange::new(2, 8),
            steps: vec![
                "Roll shoulders backwards ten times".to_string(),
                "Tilt head side to side".to_string(),
                "Stretch each wrist for twenty seconds".to_string(),
            ],
            benefits: vec!["Relieves muscle tension".to_string()],
            image_url: None,
            scientific_basis: None,
        },
        Activity {
            id: 3,
            title: "Stair walk".to_string(),
            description: "A few flights of stairs at an easy pace to get blood moving"
                .to_string(),
            category: Category::LightExercise,
            duration: 20,
            locations: vec![Location::Office, Location::Other],
            fatigue_range: FatigueRange::new(1, 6),
            steps: Vec::new(),
            benefits: vec!["Boosts circulation".to_string(), "Breaks sitting time".to_string()],
            image_url: None,
            scientific_basis: Some(
                "Short activity bouts counteract prolonged sedentary periods".to_string(),
            ),
        },
        Activity {
            id: 4,
            title: "Inbox zero sprint".to_string(),
            description: "Timeboxed pass over unread mail, answering only what takes a minute"
                .to_string(),
            category: Category::DeskWork,
            duration: 25,
            locations: vec![Location::Home, Location::Office, Location::Cafe],
            fatigue_range: FatigueRange::new(1, 5),
            steps: Vec::new(),
            benefits: vec!["Clears low-effort backlog".to_string()],
            image_url: None,
            scientific_basis: None,
        },
        Activity {
            id: 5,
            title: "Single-task focus block".to_string(),
            description: "One small task, notifications off, finish before the timer"
                .to_string(),
            category: Category::ShortFocus,
            duration: 30,
            locations: vec![Location::Home, Location::Office, Location::Cafe],
            fatigue_range: FatigueRange::new(1, 4),
            steps: vec![
                "Pick one task finishable in the slot".to_string(),
                "Silence notifications".to_string(),
                "Work until the timer ends".to_string(),
            ],
            benefits: vec!["Builds momentum".to_string()],
            image_url: None,
            scientific_basis: None,
        },
        Activity {
            id: 6,
            title: "Window gazing".to_string(),
            description: "Rest the eyes on the farthest point visible and let thoughts drift"
                .to_string(),
            category: Category::Relaxation,
            duration: 15,
            locations: vec![Location::Home, Location::Office, Location::Cafe, Location::Commuting],
            fatigue_range: FatigueRange::new(5, 10),
            steps: Vec::new(),
            benefits: vec!["Relieves eye strain".to_string()],
            image_url: None,
            scientific_basis: Some("Distance focusing relaxes the ciliary muscle".to_string()),
        },
        Activity {
            id: 7,
            title: "Cafe people sketching".to_string(),
            description: "Quick pen sketches of the room, no quality bar".to_string(),
            category: Category::LocationSpecific,
            duration: 30,
            locations: vec![Location::Cafe],
            fatigue_range: FatigueRange::new(3, 8),
            steps: Vec::new(),
            benefits: vec!["Shifts attention away from work".to_string()],
            image_url: None,
            scientific_basis: None,
        },
        Activity {
            id: 8,
            title: "Podcast chapter".to_string(),
            description: "One chapter of a light podcast while commuting".to_string(),
            category: Category::LocationSpecific,
            duration: 20,
            locations: vec![Location::Commuting],
            fatigue_range: FatigueRange::new(4, 10),
            steps: Vec::new(),
            benefits: vec!["Passive recovery".to_string()],
            image_url: None,
            scientific_basis: None,
        },
    ])
}

#[cfg(test)]
mod tests {
    use crate::catalog::seed::builtin_catalog;

    #[test]
    fn builtin_catalog_has_valid_records() {
        let catalog = builtin_catalog();
        assert!(!catalog.is_empty());
    }

    #[tokio::test]
    async fn builtin_catalog_ids_are_unique() {
        use crate::catalog::ActivityCatalog;

        let catalog = builtin_catalog();
        let activities = catalog.fetch_all().await.unwrap();
        let mut ids: Vec<i64> = activities.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), activities.len());
        for activity in &activities {
            assert!(activity.fatigue_range.is_valid());
            assert!(activity.duration > 0);
            assert!(!activity.locations.is_empty());
        }
    }
}
