pub mod summary;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Location};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Partial,
    Abandoned,
}

/// One piece of feedback a user left after an activity. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub user_id: i64,
    pub activity_id: i64,
    /// 1..=10.
    pub rating: u8,
    /// Fatigue at the time of the activity, 1..=10.
    pub fatigue_level: u8,
    pub location: Location,
    /// Minutes actually spent.
    pub duration: u32,
    pub completion_status: CompletionStatus,
    #[serde(default)]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derived per-user aggregate; computed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackSummary {
    pub total_feedbacks: usize,
    pub average_rating: f64,
    /// Percentage of records with completed status, one decimal.
    pub completion_rate: f64,
    pub most_used_category: Option<Category>,
    /// Recent-5 rating average minus the preceding-5 average, one decimal.
    pub improvement_trend: f64,
}

impl FeedbackSummary {
    pub fn empty() -> Self {
        Self {
            total_feedbacks: 0,
            average_rating: 0.0,
            completion_rate: 0.0,
            most_used_category: None,
            improvement_trend: 0.0,
        }
    }
}

/// A category the user rated highly, with supporting stats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryPreference {
    pub category: Category,
    pub average_rating: f64,
    pub count: usize,
}

/// Feedback history access, newest-first.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn recent_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<FeedbackRecord>>;
    async fn for_activity(&self, activity_id: i64, limit: usize) -> Result<Vec<FeedbackRecord>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedbackStore {
    records: Vec<FeedbackRecord>,
}

impl InMemoryFeedbackStore {
    pub fn new(mut records: Vec<FeedbackRecord>) -> Self {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { records }
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn recent_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<FeedbackRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn for_activity(&self, activity_id: i64, limit: usize) -> Result<Vec<FeedbackRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
