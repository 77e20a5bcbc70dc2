//! Range Checking for Store-Day Fields

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Day-of-week range (1 = Monday)
    pub day_of_week_range: (f64, f64),
    /// Calendar month range
    pub month_range: (f64, f64),
    /// Week number range (week 0 is the partial week before the first Monday)
    pub week_range: (f64, f64),
    /// Competition distance range (meters)
    pub distance_range: (f64, f64),
    /// Year range accepted for competition and promo start dates
    pub year_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            day_of_week_range: (1.0, 7.0),
            month_range: (1.0, 12.0),
            week_range: (0.0, 53.0),
            distance_range: (0.0, f64::MAX),
            year_range: (1900.0, 2100.0),
        }
    }
}

/// Validator for raw store-day fields
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        // NaN fails both comparisons, so test for containment instead
        if value >= range.0 && value <= range.1 {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        }
    }

    /// Validate a 0/1 flag
    pub fn validate_flag(&self, field: &'static str, value: i64) -> Result<(), ValidationError> {
        self.validate_range(field, value as f64, (0.0, 1.0))
    }

    /// Validate day of week
    pub fn validate_day_of_week(&self, day: i64) -> Result<(), ValidationError> {
        self.validate_range("day_of_week", day as f64, self.config.day_of_week_range)
    }

    /// Validate a calendar month
    pub fn validate_month(&self, field: &'static str, month: i64) -> Result<(), ValidationError> {
        self.validate_range(field, month as f64, self.config.month_range)
    }

    /// Validate a week number
    pub fn validate_week(&self, field: &'static str, week: i64) -> Result<(), ValidationError> {
        self.validate_range(field, week as f64, self.config.week_range)
    }

    /// Validate a year
    pub fn validate_year(&self, field: &'static str, year: i64) -> Result<(), ValidationError> {
        self.validate_range(field, year as f64, self.config.year_range)
    }

    /// Validate competition distance
    pub fn validate_distance(&self, distance: f64) -> Result<(), ValidationError> {
        self.validate_range("competition_distance", distance, self.config.distance_range)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
