pub mod filter;
pub mod ranker;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Category, Location};

/// Requested duration may be exceeded by 25% before an activity is excluded.
/// A product constant; do not re-derive.
pub const DURATION_TOLERANCE: f64 = 1.25;

pub const FATIGUE_MIN: u8 = 1;
pub const FATIGUE_MAX: u8 = 10;
pub const DURATION_MIN: u32 = 15;
pub const DURATION_MAX: u32 = 60;

/// Hard constraints for one recommendation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConstraintQuery {
    pub fatigue_level: u8,
    pub location: Location,
    /// Minutes the user has available.
    pub duration: u32,
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("fatigue_level must be within [{FATIGUE_MIN}, {FATIGUE_MAX}], got {0}")]
    FatigueOutOfRange(u8),
    #[error("duration must be within [{DURATION_MIN}, {DURATION_MAX}] minutes, got {0}")]
    DurationOutOfRange(u32),
}

impl ConstraintQuery {
    pub fn validate(&self) -> Result<(), ConstraintError> {
        if !(FATIGUE_MIN..=FATIGUE_MAX).contains(&self.fatigue_level) {
            return Err(ConstraintError::FatigueOutOfRange(self.fatigue_level));
        }
        if !(DURATION_MIN..=DURATION_MAX).contains(&self.duration) {
            return Err(ConstraintError::DurationOutOfRange(self.duration));
        }
        Ok(())
    }

    /// Longest activity duration the query still accepts.
    pub fn max_duration(&self) -> f64 {
        f64::from(self.duration) * DURATION_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Location;
    use crate::selection::{ConstraintError, ConstraintQuery};

    fn query(fatigue_level: u8, duration: u32) -> ConstraintQuery {
        ConstraintQuery {
            fatigue_level,
            location: Location::Home,
            duration,
            category: None,
        }
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(query(1, 15).validate().is_ok());
        assert!(query(10, 60).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_fatigue_and_duration() {
        assert_eq!(
            query(0, 30).validate(),
            Err(ConstraintError::FatigueOutOfRange(0))
        );
        assert_eq!(
            query(11, 30).validate(),
            Err(ConstraintError::FatigueOutOfRange(11))
        );
        assert_eq!(
            query(5, 14).validate(),
            Err(ConstraintError::DurationOutOfRange(14))
        );
        assert_eq!(
            query(5, 61).validate(),
            Err(ConstraintError::DurationOutOfRange(61))
        );
    }

    #[test]
    fn max_duration_applies_the_tolerance() {
        assert!((query(5, 30).max_duration() - 37.5).abs() < f64::EPSILON);
    }
}
