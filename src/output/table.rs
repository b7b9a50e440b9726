use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::catalog::Activity;
use crate::engine::{Personalization, RecommendationOutcome};
use crate::feedback::{CategoryPreference, FeedbackSummary};

pub fn render_recommendations_table(outcome: &RecommendationOutcome) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Title", "Category", "Minutes", "Fatigue", "Locations"]);

    for (idx, activity) in outcome.activities.iter().enumerate() {
        table.add_row(activity_row(idx + 1, activity));
    }

    let footer = match &outcome.personalization {
        Personalization::NotApplied => "personalization: not applied".to_string(),
        Personalization::Applied { categories } => {
            format!("personalization: applied ({})", join_categories(categories))
        }
        Personalization::Degraded { categories, reason } => format!(
            "personalization: degraded to {} ({reason})",
            join_categories(categories)
        ),
    };
    format!("{table}\n{footer}")
}

pub fn render_catalog_table(activities: &[Activity]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Title", "Category", "Minutes", "Fatigue", "Locations"]);
    for (idx, activity) in activities.iter().enumerate() {
        table.add_row(activity_row(idx + 1, activity));
    }
    table.to_string()
}

pub fn render_summary_table(summary: &FeedbackSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Feedbacks",
        "Avg rating",
        "Completion %",
        "Top category",
        "Trend",
    ]);

    let trend_cell = if summary.improvement_trend > 0.0 {
        Cell::new(format!("+{:.1}", summary.improvement_trend)).fg(Color::Green)
    } else if summary.improvement_trend < 0.0 {
        Cell::new(format!("{:.1}", summary.improvement_trend)).fg(Color::Red)
    } else {
        Cell::new("0.0")
    };
    table.add_row(Row::from(vec![
        Cell::new(summary.total_feedbacks.to_string()),
        Cell::new(format!("{:.1}", summary.average_rating)),
        Cell::new(format!("{:.1}", summary.completion_rate)),
        Cell::new(
            summary
                .most_used_category
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        trend_cell,
    ]));
    table.to_string()
}

pub fn render_preferences_table(preferences: &[CategoryPreference]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Avg rating", "Count"]);
    for preference in preferences {
        table.add_row(Row::from(vec![
            Cell::new(preference.category.to_string()),
            Cell::new(format!("{:.1}", preference.average_rating)),
            Cell::new(preference.count.to_string()),
        ]));
    }
    table.to_string()
}

fn activity_row(rank: usize, activity: &Activity) -> Row {
    Row::from(vec![
        Cell::new(rank.to_string()),
        Cell::new(activity.title.clone()),
        Cell::new(activity.category.to_string()),
        Cell::new(activity.duration.to_string()),
        Cell::new(format!(
            "{}-{}",
            activity.fatigue_range.min, activity.fatigue_range.max
        )),
        Cell::new(
            activity
                .locations
                .iter()
                .map(|l| l.as_slug())
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ])
}

fn join_categories(categories: &[crate::catalog::Category]) -> String {
    categories
        .iter()
        .map(|c| c.as_slug())
        .collect::<Vec<_>>()
        .join(" > ")
}
