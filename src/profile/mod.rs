use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_INTERESTS: usize = 5;
pub const MAX_REST_PREFERENCES: usize = 3;

/// Stored preference profile, one per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub interests: Vec<String>,
    pub work_style: String,
    pub rest_preferences: Vec<String>,
    /// AI-generated summary of the structured fields. Allowed to be stale or
    /// absent when regeneration fails.
    #[serde(default)]
    pub textual_profile: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured fields submitted on profile create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub interests: Vec<String>,
    pub work_style: String,
    pub rest_preferences: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("at most {MAX_INTERESTS} interests are allowed, got {0}")]
    TooManyInterests(usize),
    #[error("at most {MAX_REST_PREFERENCES} rest preferences are allowed, got {0}")]
    TooManyRestPreferences(usize),
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.interests.len() > MAX_INTERESTS {
            return Err(ProfileError::TooManyInterests(self.interests.len()));
        }
        if self.rest_preferences.len() > MAX_REST_PREFERENCES {
            return Err(ProfileError::TooManyRestPreferences(
                self.rest_preferences.len(),
            ));
        }
        Ok(())
    }
}

/// Profile persistence owned by the surrounding service; the engine only needs
/// fetch, upsert of structured fields, and the textual-profile write-back.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, user_id: i64) -> Result<Option<UserProfile>>;
    async fn upsert(&self, user_id: i64, patch: ProfilePatch) -> Result<UserProfile>;
    async fn set_textual_profile(&self, user_id: i64, text: String) -> Result<UserProfile>;
}

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<Vec<UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let profiles = self.profiles.lock().expect("profile store lock poisoned");
        Ok(profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn upsert(&self, user_id: i64, patch: ProfilePatch) -> Result<UserProfile> {
        let mut profiles = self.profiles.lock().expect("profile store lock poisoned");
        let now = Utc::now();
        if let Some(existing) = profiles.iter_mut().find(|p| p.user_id == user_id) {
            existing.interests = patch.interests;
            existing.work_style = patch.work_style;
            existing.rest_preferences = patch.rest_preferences;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let profile = UserProfile {
            user_id,
            interests: patch.interests,
            work_style: patch.work_style,
            rest_preferences: patch.rest_preferences,
            textual_profile: None,
            created_at: now,
            updated_at: now,
        };
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn set_textual_profile(&self, user_id: i64, text: String) -> Result<UserProfile> {
        let mut profiles = self.profiles.lock().expect("profile store lock poisoned");
        let profile = profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| anyhow::anyhow!("no profile stored for user {user_id}"))?;
        profile.textual_profile = Some(text);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }
}
