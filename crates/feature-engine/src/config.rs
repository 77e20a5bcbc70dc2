//! Pipeline configuration

use data_validator::ValidationConfig;
use serde::{Deserialize, Serialize};

/// What to do with categorical codes outside the known set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCodePolicy {
    /// Map to the field's fallback category
    #[default]
    Fallback,
    /// Fail the request
    Reject,
}

/// What to do with rows for closed stores (`Open == 0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedStorePolicy {
    /// Drop from the feature matrix and return the row without a prediction
    #[default]
    PassThrough,
    /// Fail the whole batch
    Reject,
}

/// Week convention used to resolve promo2-since year/week into a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoWeekNumbering {
    /// `%Y-%W-%w`: week 1 starts on the year's first Monday
    #[default]
    Strftime,
    /// ISO-8601 week date
    Iso,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Handling of unmapped assortment/state-holiday codes
    pub unknown_codes: UnknownCodePolicy,

    /// Handling of closed-store rows
    pub closed_stores: ClosedStorePolicy,

    /// Week convention for promo start dates
    pub promo_week_numbering: PromoWeekNumbering,

    /// Distance assumed when no competitor distance is known (meters)
    pub missing_competition_distance: f64,

    /// Ranges for raw field validation
    pub validation: ValidationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            unknown_codes: UnknownCodePolicy::Fallback,
            closed_stores: ClosedStorePolicy::PassThrough,
            promo_week_numbering: PromoWeekNumbering::Strftime,
            missing_competition_distance: 200_000.0,
            validation: ValidationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject anything outside the known codes and any closed-store row
    pub fn strict() -> Self {
        Self {
            unknown_codes: UnknownCodePolicy::Reject,
            closed_stores: ClosedStorePolicy::Reject,
            ..Default::default()
        }
    }
}
