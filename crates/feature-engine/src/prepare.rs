//! Preparation Stage: rescaling, encoding and projection to the model layout

use std::collections::BTreeSet;
use tracing::debug;

use crate::cyclical::{
    encode, DAY_OF_MONTH_PERIOD, DAY_OF_WEEK_PERIOD, MONTH_PERIOD, WEEK_OF_YEAR_PERIOD,
};
use crate::engineer::EngineeredRecord;
use crate::error::FeatureError;
use crate::features::{FeatureVector, FEATURE_DIMENSION};
use crate::params::TransformerSet;
use crate::record::StateHoliday;

/// A fully encoded record, before projection
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub row: usize,
    pub store: f64,
    pub promo: f64,
    pub store_type: f64,
    pub assortment: f64,
    pub competition_distance: f64,
    pub competition_open_since_month: f64,
    pub competition_open_since_year: f64,
    pub promo2: f64,
    pub promo2_since_week: f64,
    pub promo2_since_year: f64,
    pub competition_time_month: f64,
    pub promo_time_week: f64,
    /// Scaled year; computed but not part of the model input
    pub year: f64,
    pub state_holiday: StateHoliday,
    pub day_of_week_sin: f64,
    pub day_of_week_cos: f64,
    pub month_sin: f64,
    pub month_cos: f64,
    pub day_sin: f64,
    pub day_cos: f64,
    pub week_of_year_sin: f64,
    pub week_of_year_cos: f64,
}

impl PreparedRecord {
    /// Project onto the model's column order
    pub fn to_feature_vector(&self) -> FeatureVector {
        let values: [f64; FEATURE_DIMENSION] = [
            self.store,
            self.promo,
            self.store_type,
            self.assortment,
            self.competition_distance,
            self.competition_open_since_month,
            self.competition_open_since_year,
            self.promo2,
            self.promo2_since_week,
            self.promo2_since_year,
            self.competition_time_month,
            self.promo_time_week,
            self.day_of_week_sin,
            self.day_of_week_cos,
            self.month_sin,
            self.month_cos,
            self.day_sin,
            self.day_cos,
            self.week_of_year_sin,
            self.week_of_year_cos,
        ];
        FeatureVector {
            row: self.row,
            values,
        }
    }
}

/// One-hot indicator columns for the state holidays seen in a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneHot {
    /// Column categories, sorted by label
    pub categories: Vec<StateHoliday>,
    /// One indicator row per record
    pub rows: Vec<Vec<bool>>,
}

impl OneHot {
    /// Column names in `state_holiday_<label>` form
    pub fn column_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("state_holiday_{}", c.as_str()))
            .collect()
    }
}

/// One-hot encode the state holidays of a batch
pub fn one_hot_state_holiday(values: &[StateHoliday]) -> OneHot {
    let categories: Vec<StateHoliday> = values
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let rows = values
        .iter()
        .map(|v| categories.iter().map(|c| c == v).collect())
        .collect();
    OneHot { categories, rows }
}

/// Output of the preparation stage
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub records: Vec<PreparedRecord>,
    pub state_holiday: OneHot,
}

impl PreparedBatch {
    /// Model input rows, in record order
    pub fn feature_matrix(&self) -> Vec<FeatureVector> {
        self.records
            .iter()
            .map(PreparedRecord::to_feature_vector)
            .collect()
    }
}

/// Encode one record with the frozen transformers
pub fn prepare_record(
    record: &EngineeredRecord,
    transformers: &TransformerSet,
) -> Result<PreparedRecord, FeatureError> {
    let store_type = transformers
        .store_type
        .transform(&record.store_type)
        .map_err(|source| FeatureError::Validation {
            row: record.row,
            source,
        })?;

    let (day_of_week_sin, day_of_week_cos) =
        encode(record.day_of_week as f64, DAY_OF_WEEK_PERIOD);
    let (month_sin, month_cos) = encode(record.month as f64, MONTH_PERIOD);
    let (day_sin, day_cos) = encode(record.day as f64, DAY_OF_MONTH_PERIOD);
    let (week_of_year_sin, week_of_year_cos) =
        encode(record.week_of_year as f64, WEEK_OF_YEAR_PERIOD);

    Ok(PreparedRecord {
        row: record.row,
        store: record.store as f64,
        promo: record.promo as f64,
        store_type: store_type as f64,
        assortment: record.assortment.ordinal() as f64,
        competition_distance: transformers
            .competition_distance
            .transform(record.competition_distance),
        competition_open_since_month: record.competition_open_since_month as f64,
        competition_open_since_year: record.competition_open_since_year as f64,
        promo2: record.promo2 as f64,
        promo2_since_week: record.promo2_since_week as f64,
        promo2_since_year: record.promo2_since_year as f64,
        competition_time_month: transformers
            .competition_time_month
            .transform(record.competition_time_month as f64),
        promo_time_week: transformers
            .promo_time_week
            .transform(record.promo_time_week as f64),
        year: transformers.year.transform(record.year as f64),
        state_holiday: record.state_holiday,
        day_of_week_sin,
        day_of_week_cos,
        month_sin,
        month_cos,
        day_sin,
        day_cos,
        week_of_year_sin,
        week_of_year_cos,
    })
}

/// Encode a batch with the frozen transformers
pub fn prepare(
    records: &[EngineeredRecord],
    transformers: &TransformerSet,
) -> Result<PreparedBatch, FeatureError> {
    let prepared = records
        .iter()
        .map(|r| prepare_record(r, transformers))
        .collect::<Result<Vec<_>, _>>()?;

    let holidays: Vec<StateHoliday> = prepared.iter().map(|r| r.state_holiday).collect();
    let state_holiday = one_hot_state_holiday(&holidays);

    debug!(
        "Prepared {} records, state holiday columns {:?}",
        prepared.len(),
        state_holiday.column_names()
    );

    Ok(PreparedBatch {
        records: prepared,
        state_holiday,
    })
}
