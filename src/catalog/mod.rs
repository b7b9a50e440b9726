pub mod seed;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of activity categories. Shared by the catalog and the
/// preference signal so category comparison is never string-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Relaxation,
    LightExercise,
    DeskWork,
    ShortFocus,
    LocationSpecific,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Relaxation,
        Category::LightExercise,
        Category::DeskWork,
        Category::ShortFocus,
        Category::LocationSpecific,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Relaxation => "relaxation",
            Self::LightExercise => "light_exercise",
            Self::DeskWork => "desk_work",
            Self::ShortFocus => "short_focus",
            Self::LocationSpecific => "location_specific",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown activity category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "relaxation" => Ok(Self::Relaxation),
            "light_exercise" => Ok(Self::LightExercise),
            "desk_work" => Ok(Self::DeskWork),
            "short_focus" => Ok(Self::ShortFocus),
            "location_specific" => Ok(Self::LocationSpecific),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

/// Closed set of places a break can happen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Home,
    Office,
    Cafe,
    Commuting,
    Other,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::Home,
        Location::Office,
        Location::Cafe,
        Location::Commuting,
        Location::Other,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Office => "office",
            Self::Cafe => "cafe",
            Self::Commuting => "commuting",
            Self::Other => "other",
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown location: {0}")]
pub struct LocationParseError(pub String);

impl FromStr for Location {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "home" => Ok(Self::Home),
            "office" => Ok(Self::Office),
            "cafe" => Ok(Self::Cafe),
            "commuting" | "commute" => Ok(Self::Commuting),
            "other" => Ok(Self::Other),
            _ => Err(LocationParseError(s.to_string())),
        }
    }
}

/// Fatigue applicability window, inclusive on both ends, 1..=10.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FatigueRange {
    pub min: u8,
    pub max: u8,
}

impl FatigueRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// An inverted range can only come from a corrupt record; callers skip
    /// such activities rather than abort.
    pub fn is_valid(&self) -> bool {
        (1..=10).contains(&self.min) && (1..=10).contains(&self.max) && self.min <= self.max
    }

    pub fn contains(&self, fatigue_level: u8) -> bool {
        (self.min..=self.max).contains(&fatigue_level)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    /// Minutes.
    pub duration: u32,
    pub locations: Vec<Location>,
    pub fatigue_range: FatigueRange,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub scientific_basis: Option<String>,
}

impl Activity {
    pub fn available_at(&self, location: Location) -> bool {
        self.locations.contains(&location)
    }
}

/// Read-only catalog access. The engine never writes through this.
#[async_trait]
pub trait ActivityCatalog: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Activity>>;
    async fn fetch_by_id(&self, id: i64) -> Result<Option<Activity>>;
}

/// Catalog backed by an in-memory snapshot, preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    activities: Vec<Activity>,
}

impl InMemoryCatalog {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

#[async_trait]
impl ActivityCatalog for InMemoryCatalog {
    async fn fetch_all(&self) -> Result<Vec<Activity>> {
        Ok(self.activities.clone())
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<Activity>> {
        Ok(self.activities.iter().find(|a| a.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::catalog::{Category, FatigueRange, Location};

    #[test]
    fn category_round_trips_through_slug() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_slug()).unwrap(), category);
        }
    }

    #[test]
    fn category_parse_is_forgiving_about_case_and_dashes() {
        assert_eq!(
            Category::from_str("Light-Exercise").unwrap(),
            Category::LightExercise
        );
        assert!(Category::from_str("yoga").is_err());
    }

    #[test]
    fn location_parse_accepts_commute_alias() {
        assert_eq!(Location::from_str("commute").unwrap(), Location::Commuting);
        assert!(Location::from_str("beach").is_err());
    }

    #[test]
    fn fatigue_range_containment_is_inclusive() {
        let range = FatigueRange::new(3, 7);
        assert!(range.contains(3));
        assert!(range.contains(7));
        assert!(!range.contains(2));
        assert!(!range.contains(8));
    }

    #[test]
    fn inverted_fatigue_range_is_invalid() {
        assert!(!FatigueRange::new(8, 2).is_valid());
        assert!(!FatigueRange::new(0, 5).is_valid());
        assert!(FatigueRange::new(1, 10).is_valid());
    }
}
