use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Category, Location};
use crate::feedback::CompletionStatus;
use crate::profile::ProfilePatch;
use crate::signal::gemini::TextGenerator;
use crate::signal::{
    FallbackReason, PreferenceSignal, DEFAULT_SITUATIONAL_CATEGORIES,
};

/// Prompts carry at most this many recent feedback entries.
const MAX_FEEDBACK_IN_PROMPT: usize = 5;

/// Situational recommendations are capped at three categories.
const MAX_SITUATIONAL_CATEGORIES: usize = 3;

/// Returned in place of a textual profile when generation fails; the profile
/// itself persists without a summary.
pub const PROFILE_GENERATION_APOLOGY: &str =
    "プロファイル生成中にエラーが発生しました。しばらく経ってからお試しください。";

/// Reduced feedback view included in personalization prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackDigest {
    pub activity_title: String,
    pub category: Category,
    pub rating: u8,
    pub fatigue_level: u8,
    pub completion_status: CompletionStatus,
}

/// Wraps the text-generation capability behind the three templated
/// operations the engine needs. Every operation is single-attempt and
/// resolves failures to documented fallbacks instead of propagating them.
#[derive(Clone)]
pub struct PreferenceAdapter {
    generator: Arc<dyn TextGenerator>,
}

impl PreferenceAdapter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Infers an ordered category preference from a textual profile, the
    /// current fatigue level and recent feedback. Never fails: malformed or
    /// absent model output degrades to the fixed default list.
    pub async fn infer_preferences(
        &self,
        textual_profile: &str,
        fatigue_level: u8,
        recent_feedback: &[FeedbackDigest],
    ) -> PreferenceSignal {
        let prompt = personalization_prompt(textual_profile, fatigue_level, recent_feedback);
        let response = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!("preference inference call failed: {err:#}");
                return PreferenceSignal::fallback(FallbackReason::GenerationFailed);
            }
        };

        let Some(json_str) = extract_json_object(&response) else {
            warn!("no JSON object found in preference inference response");
            return PreferenceSignal::fallback(FallbackReason::UnparseableResponse);
        };
        let parsed: serde_json::Value = match serde_json::from_str(json_str) {
            Ok(value) => value,
            Err(err) => {
                warn!("failed parsing JSON from preference inference response: {err}");
                return PreferenceSignal::fallback(FallbackReason::UnparseableResponse);
            }
        };
        let Some(raw_types) = parsed
            .get("recommended_activity_types")
            .and_then(|v| v.as_array())
        else {
            warn!("preference inference response lacks recommended_activity_types");
            return PreferenceSignal::fallback(FallbackReason::MissingField);
        };

        let categories = parse_categories(raw_types.iter().filter_map(|v| v.as_str()));
        PreferenceSignal::Inferred { categories }
    }

    /// Produces a short descriptive profile text from the structured
    /// preference fields. On failure returns the fixed apology string so the
    /// caller can store the profile without a summary.
    pub async fn generate_textual_profile(&self, patch: &ProfilePatch) -> String {
        let prompt = profile_prompt(patch);
        match self.generator.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!("textual profile generation failed: {err:#}");
                PROFILE_GENERATION_APOLOGY.to_string()
            }
        }
    }

    /// Picks up to three categories fitting the profile and current
    /// situation. Unknown identifiers are dropped; failure degrades to the
    /// fixed three-category default.
    pub async fn recommended_categories(
        &self,
        textual_profile: &str,
        fatigue_level: u8,
        location: Location,
    ) -> Vec<Category> {
        let prompt = situational_prompt(textual_profile, fatigue_level, location);
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let mut categories = parse_categories(text.split(','));
                categories.truncate(MAX_SITUATIONAL_CATEGORIES);
                categories
            }
            Err(err) => {
                warn!("situational category call failed: {err:#}");
                DEFAULT_SITUATIONAL_CATEGORIES.to_vec()
            }
        }
    }
}

fn parse_categories<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<Category> {
    let mut out = Vec::new();
    for piece in raw {
        match Category::from_str(piece) {
            Ok(category) => {
                if !out.contains(&category) {
                    out.push(category);
                }
            }
            Err(err) => debug!("dropping unrecognized category from model output: {err}"),
        }
    }
    out
}

/// Pulls the JSON object out of a response that may wrap it in fenced markup.
fn extract_json_object(text: &str) -> Option<&str> {
    if let Some(fenced) = extract_fenced(text, "```json") {
        return Some(fenced);
    }
    if let Some(fenced) = extract_fenced(text, "```") {
        return Some(fenced);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].trim())
}

fn extract_fenced<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let after_open = &text[text.find(fence)? + fence.len()..];
    let close = after_open.find("```")?;
    let inner = after_open[..close].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

fn personalization_prompt(
    textual_profile: &str,
    fatigue_level: u8,
    recent_feedback: &[FeedbackDigest],
) -> String {
    let mut feedback_block = String::new();
    for (idx, digest) in recent_feedback.iter().take(MAX_FEEDBACK_IN_PROMPT).enumerate() {
        let _ = writeln!(
            feedback_block,
            "Activity {}: {} ({}) - rating {}/10, fatigue {}/10, {:?}",
            idx + 1,
            digest.activity_title,
            digest.category,
            digest.rating,
            digest.fatigue_level,
            digest.completion_status,
        );
    }
    if feedback_block.is_empty() {
        feedback_block.push_str("No feedback yet.\n");
    }

    format!(
        r#"You are an assistant that personalizes micro-break activity suggestions.

Analyze the user profile, their recent feedback and their current fatigue
level, then answer with ONLY the following JSON format:

```json
{{
    "recommended_activity_types": ["type1", "type2", "type3"],
    "reasoning": "short explanation"
}}
```

Valid activity types are exactly: relaxation, light_exercise, desk_work,
short_focus, location_specific.

User profile: {textual_profile}

Recent feedback:
{feedback_block}
Current fatigue level: {fatigue_level}/10
"#
    )
}

fn profile_prompt(patch: &ProfilePatch) -> String {
    format!(
        r#"You are an assistant that analyzes user profiles and suggests fitting activities.

Summarize in about 200 characters what kind of person this is and which
break activities suit them:

Interests: {}
Work style: {}
Rest preferences: {}"#,
        patch.interests.join(", "),
        patch.work_style,
        patch.rest_preferences.join(", "),
    )
}

fn situational_prompt(textual_profile: &str, fatigue_level: u8, location: Location) -> String {
    format!(
        r#"You are an assistant that picks micro-break activity categories.

From the user profile and situation below, choose the three best activity
categories. Answer with the category names only, comma separated.

User profile: {textual_profile}
Current fatigue level: {fatigue_level}/10
Current location: {location}

Available categories:
- relaxation
- light_exercise
- desk_work
- short_focus
- location_specific"#
    )
}
