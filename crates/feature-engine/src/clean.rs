//! Cleaning Stage: null fills, integer casts and the promo-month flag

use chrono::{Datelike, NaiveDate};
use data_validator::{ValidationError, Validator};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::FeatureError;
use crate::record::RawRecord;

/// Month labels as written by the training notebook. `Fev` and `Sep` do not
/// match the dataset's `Feb` and `Sept` tokens; the model learned that.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A record with every nullable field filled
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    /// Position of the source record in the request
    pub row: usize,
    pub store: i64,
    pub day_of_week: i64,
    pub date: NaiveDate,
    pub open: Option<i64>,
    pub promo: i64,
    pub state_holiday: String,
    pub school_holiday: i64,
    pub store_type: String,
    pub assortment: String,
    pub competition_distance: f64,
    pub competition_open_since_month: i32,
    pub competition_open_since_year: i32,
    pub promo2: i64,
    pub promo2_since_week: i32,
    pub promo2_since_year: i32,
    pub promo_interval: Option<String>,
    pub month_map: &'static str,
    pub is_promo: u8,
}

/// Label of a calendar month (1-based)
pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month as usize - 1) % 12]
}

/// Whether `month` appears in a comma-separated promo interval
pub fn is_promo_month(interval: Option<&str>, month: &str) -> bool {
    match interval {
        Some(interval) => interval.split(',').any(|m| m == month),
        None => false,
    }
}

/// Clean a single record
pub fn clean_record(
    row: usize,
    raw: &RawRecord,
    config: &PipelineConfig,
    validator: &Validator,
) -> Result<CleanRecord, FeatureError> {
    let check = |result: Result<(), ValidationError>| {
        result.map_err(|source| FeatureError::Validation { row, source })
    };

    let date = raw.date;
    let competition_distance = raw
        .competition_distance
        .unwrap_or(config.missing_competition_distance);
    let competition_open_since_month = raw
        .competition_open_since_month
        .map_or(date.month() as i32, |v| v as i32);
    let competition_open_since_year = raw
        .competition_open_since_year
        .map_or(date.year(), |v| v as i32);
    let promo2_since_week = raw
        .promo2_since_week
        .map_or(date.iso_week().week() as i32, |v| v as i32);
    let promo2_since_year = raw.promo2_since_year.map_or(date.year(), |v| v as i32);

    check(validator.validate_day_of_week(raw.day_of_week))?;
    if let Some(open) = raw.open {
        check(validator.validate_flag("open", open))?;
    }
    check(validator.validate_flag("promo", raw.promo))?;
    check(validator.validate_flag("school_holiday", raw.school_holiday))?;
    check(validator.validate_flag("promo2", raw.promo2))?;
    check(validator.validate_distance(competition_distance))?;
    check(validator.validate_month(
        "competition_open_since_month",
        competition_open_since_month as i64,
    ))?;
    check(validator.validate_year(
        "competition_open_since_year",
        competition_open_since_year as i64,
    ))?;
    check(validator.validate_week("promo2_since_week", promo2_since_week as i64))?;
    check(validator.validate_year("promo2_since_year", promo2_since_year as i64))?;

    let month_map = month_abbreviation(date.month());
    let is_promo = is_promo_month(raw.promo_interval.as_deref(), month_map) as u8;

    Ok(CleanRecord {
        row,
        store: raw.store,
        day_of_week: raw.day_of_week,
        date,
        open: raw.open,
        promo: raw.promo,
        state_holiday: raw.state_holiday.clone(),
        school_holiday: raw.school_holiday,
        store_type: raw.store_type.clone(),
        assortment: raw.assortment.clone(),
        competition_distance,
        competition_open_since_month,
        competition_open_since_year,
        promo2: raw.promo2,
        promo2_since_week,
        promo2_since_year,
        promo_interval: raw.promo_interval.clone(),
        month_map,
        is_promo,
    })
}

/// Clean a batch, preserving input order
pub fn clean(
    records: &[RawRecord],
    config: &PipelineConfig,
) -> Result<Vec<CleanRecord>, FeatureError> {
    let validator = Validator::new(config.validation.clone());
    let cleaned = records
        .iter()
        .enumerate()
        .map(|(row, raw)| clean_record(row, raw, config, &validator))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Cleaned {} records", cleaned.len());
    Ok(cleaned)
}
