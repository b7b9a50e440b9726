pub mod adapter;
pub mod gemini;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::catalog::Category;

/// Default preference order used when inference fails.
pub const DEFAULT_PREFERENCES: [Category; 2] = [Category::Relaxation, Category::LightExercise];

/// Default categories for the situational recommendation operation.
pub const DEFAULT_SITUATIONAL_CATEGORIES: [Category; 3] = [
    Category::Relaxation,
    Category::LightExercise,
    Category::DeskWork,
];

/// Outcome of one preference inference call.
///
/// A degraded result carries a usable category list too, but is tagged so a
/// caller can never mistake the fallback for a model-derived ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PreferenceSignal {
    Inferred { categories: Vec<Category> },
    Fallback {
        categories: Vec<Category>,
        reason: FallbackReason,
    },
}

impl PreferenceSignal {
    pub fn fallback(reason: FallbackReason) -> Self {
        Self::Fallback {
            categories: DEFAULT_PREFERENCES.to_vec(),
            reason,
        }
    }

    pub fn categories(&self) -> &[Category] {
        match self {
            Self::Inferred { categories } | Self::Fallback { categories, .. } => categories,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The external call itself failed.
    GenerationFailed,
    /// The response contained no parseable JSON object.
    UnparseableResponse,
    /// JSON parsed but the expected field was missing.
    MissingField,
}

impl Display for FallbackReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::GenerationFailed => "generation failed",
            Self::UnparseableResponse => "unparseable response",
            Self::MissingField => "missing recommended_activity_types field",
        };
        write!(f, "{label}")
    }
}
