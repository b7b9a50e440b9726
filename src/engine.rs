use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{Activity, ActivityCatalog, Category, Location};
use crate::feedback::summary::{category_preferences, summarize};
use crate::feedback::{CategoryPreference, FeedbackStore, FeedbackSummary};
use crate::profile::{ProfileError, ProfilePatch, ProfileStore, UserProfile};
use crate::selection::filter::filter_activities;
use crate::selection::ranker::apply_signal;
use crate::selection::{ConstraintError, ConstraintQuery};
use crate::signal::adapter::{FeedbackDigest, PreferenceAdapter, PROFILE_GENERATION_APOLOGY};
use crate::signal::{FallbackReason, PreferenceSignal, DEFAULT_SITUATIONAL_CATEGORIES};

/// Errors the engine surfaces to its caller. Personalization failures are
/// not among them; those degrade internally.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    Constraint(#[from] ConstraintError),
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("activity {0} not found")]
    ActivityNotFound(i64),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// How the final ordering of a recommendation was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Personalization {
    /// No identity, no stored profile, or no textual profile: catalog order.
    NotApplied,
    /// Ranked with a model-derived preference list.
    Applied { categories: Vec<Category> },
    /// Ranked with the fixed fallback list after a personalization failure.
    Degraded {
        categories: Vec<Category>,
        reason: FallbackReason,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    pub activities: Vec<Activity>,
    pub personalization: Personalization,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Filtered candidates are capped at this many before ranking.
    pub max_results: usize,
    /// Feedback records fetched for the personalization digest.
    pub feedback_window: usize,
    /// Feedback records fetched for summary and preference queries.
    pub summary_window: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            feedback_window: 10,
            summary_window: 100,
        }
    }
}

/// Candidate selection and personalized ranking over pluggable collaborators.
///
/// Per request this runs one filter pass, at most one external text-generation
/// call, and one sort; no shared mutable state, so concurrent requests need no
/// coordination.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn ActivityCatalog>,
    feedback: Arc<dyn FeedbackStore>,
    profiles: Arc<dyn ProfileStore>,
    adapter: PreferenceAdapter,
    options: EngineOptions,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn ActivityCatalog>,
        feedback: Arc<dyn FeedbackStore>,
        profiles: Arc<dyn ProfileStore>,
        adapter: PreferenceAdapter,
        options: EngineOptions,
    ) -> Self {
        Self {
            catalog,
            feedback,
            profiles,
            adapter,
            options,
        }
    }

    /// The core recommendation flow: validate, filter, then personalize
    /// best-effort. The filtered result is returned even when every
    /// personalization step fails.
    pub async fn recommend(
        &self,
        query: ConstraintQuery,
        user_id: Option<i64>,
    ) -> Result<RecommendationOutcome, EngineError> {
        query.validate()?;
        let snapshot = self.catalog.fetch_all().await?;
        let mut filtered = filter_activities(&snapshot, &query);
        filtered.truncate(self.options.max_results);

        let Some(user_id) = user_id else {
            return Ok(RecommendationOutcome {
                activities: filtered,
                personalization: Personalization::NotApplied,
            });
        };

        let Some(signal) = self
            .preference_signal(user_id, query.fatigue_level, &snapshot)
            .await
        else {
            return Ok(RecommendationOutcome {
                activities: filtered,
                personalization: Personalization::NotApplied,
            });
        };

        let activities = apply_signal(filtered, &signal);
        let personalization = match signal {
            PreferenceSignal::Inferred { categories } => Personalization::Applied { categories },
            PreferenceSignal::Fallback { categories, reason } => {
                warn!(user_id, %reason, "personalization degraded to fallback list");
                Personalization::Degraded { categories, reason }
            }
        };
        Ok(RecommendationOutcome {
            activities,
            personalization,
        })
    }

    /// Best-effort preference inference. `None` means personalization is not
    /// applicable (no profile or textual profile) or a collaborator failed;
    /// either way the caller falls back to catalog order.
    async fn preference_signal(
        &self,
        user_id: i64,
        fatigue_level: u8,
        snapshot: &[Activity],
    ) -> Option<PreferenceSignal> {
        let profile = match self.profiles.fetch(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user_id, "profile lookup failed, skipping personalization: {err:#}");
                return None;
            }
        };
        let textual_profile = profile.and_then(|p| p.textual_profile)?;

        let history = match self
            .feedback
            .recent_for_user(user_id, self.options.feedback_window)
            .await
        {
            Ok(history) => history,
            Err(err) => {
                warn!(user_id, "feedback lookup failed, skipping personalization: {err:#}");
                return None;
            }
        };

        let mut digest = Vec::with_capacity(history.len());
        for record in &history {
            let Some(activity) = snapshot.iter().find(|a| a.id == record.activity_id) else {
                warn!(
                    feedback_id = record.id,
                    activity_id = record.activity_id,
                    "feedback references a missing activity, excluded from digest"
                );
                continue;
            };
            digest.push(FeedbackDigest {
                activity_title: activity.title.clone(),
                category: activity.category,
                rating: record.rating,
                fatigue_level: record.fatigue_level,
                completion_status: record.completion_status,
            });
        }

        Some(
            self.adapter
                .infer_preferences(&textual_profile, fatigue_level, &digest)
                .await,
        )
    }

    /// Lookup with must-exist semantics.
    pub async fn activity(&self, id: i64) -> Result<Activity, EngineError> {
        self.catalog
            .fetch_by_id(id)
            .await?
            .ok_or(EngineError::ActivityNotFound(id))
    }

    pub async fn user_summary(&self, user_id: i64) -> Result<FeedbackSummary, EngineError> {
        let history = self
            .feedback
            .recent_for_user(user_id, self.options.summary_window)
            .await?;
        let snapshot = self.catalog.fetch_all().await?;
        Ok(summarize(&history, &snapshot))
    }

    pub async fn user_preferences(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<CategoryPreference>, EngineError> {
        let history = self
            .feedback
            .recent_for_user(user_id, self.options.summary_window)
            .await?;
        let snapshot = self.catalog.fetch_all().await?;
        Ok(category_preferences(&history, &snapshot, limit))
    }

    /// Creates or updates the structured profile and regenerates the textual
    /// profile. A failed regeneration leaves the previous text in place.
    pub async fn apply_profile(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<UserProfile, EngineError> {
        patch.validate()?;
        let profile = self.profiles.upsert(user_id, patch.clone()).await?;
        let text = self.adapter.generate_textual_profile(&patch).await;
        if text == PROFILE_GENERATION_APOLOGY {
            warn!(user_id, "textual profile regeneration failed, keeping stale text");
            return Ok(profile);
        }
        Ok(self.profiles.set_textual_profile(user_id, text).await?)
    }

    /// Situational category suggestion from the stored textual profile.
    /// Without one the fixed default list is returned.
    pub async fn situational_categories(
        &self,
        user_id: i64,
        fatigue_level: u8,
        location: Location,
    ) -> Result<Vec<Category>, EngineError> {
        let profile = self.profiles.fetch(user_id).await?;
        let Some(textual_profile) = profile.and_then(|p| p.textual_profile) else {
            debug!(user_id, "no textual profile, using default situational categories");
            return Ok(DEFAULT_SITUATIONAL_CATEGORIES.to_vec());
        };
        Ok(self
            .adapter
            .recommended_categories(&textual_profile, fatigue_level, location)
            .await)
    }
}
