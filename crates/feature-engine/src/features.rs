//! Feature Vector Layout

use serde::{Deserialize, Serialize};

/// Number of features consumed by the model
pub const FEATURE_DIMENSION: usize = 20;

/// Column order the model was trained on
pub const FEATURE_COLUMNS: [&str; FEATURE_DIMENSION] = [
    "store",
    "promo",
    "store_type",
    "assortment",
    "competition_distance",
    "competition_open_since_month",
    "competition_open_since_year",
    "promo2",
    "promo2_since_week",
    "promo2_since_year",
    "competition_time_month",
    "promo_time_week",
    "day_of_week_sin",
    "day_of_week_cos",
    "month_sin",
    "month_cos",
    "day_sin",
    "day_cos",
    "week_of_year_sin",
    "week_of_year_cos",
];

/// One model input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Position of the source record in the request
    pub row: usize,
    /// Values in `FEATURE_COLUMNS` order
    pub values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }

    /// Values narrowed to the model's input precision
    pub fn to_f32(&self) -> [f32; FEATURE_DIMENSION] {
        self.values.map(|v| v as f32)
    }
}
