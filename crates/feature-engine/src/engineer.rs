//! Feature Engineering Stage: calendar breakdown, durations and recoding

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::{debug, warn};

use crate::clean::CleanRecord;
use crate::config::{ClosedStorePolicy, PipelineConfig, PromoWeekNumbering, UnknownCodePolicy};
use crate::error::FeatureError;
use crate::record::{Assortment, StateHoliday};

/// Days per "month" in the competition duration
pub const DAYS_PER_MONTH: i64 = 30;

/// Days per week in the promo duration
pub const DAYS_PER_WEEK: i64 = 7;

/// A cleaned record of an open store with derived features
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredRecord {
    pub row: usize,
    pub store: i64,
    pub day_of_week: i64,
    pub date: NaiveDate,
    pub promo: i64,
    pub school_holiday: i64,
    pub store_type: String,
    pub assortment: Assortment,
    pub state_holiday: StateHoliday,
    pub competition_distance: f64,
    pub competition_open_since_month: i32,
    pub competition_open_since_year: i32,
    pub promo2: i64,
    pub promo2_since_week: i32,
    pub promo2_since_year: i32,
    pub is_promo: u8,

    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub week_of_year: u32,
    /// `%Y-%W` label
    pub year_week: String,

    pub competition_since: NaiveDate,
    pub competition_time_month: i64,
    pub promo_since: NaiveDate,
    pub promo_time_week: i64,
}

/// Output of the engineering stage
#[derive(Debug, Clone, Default)]
pub struct Engineered {
    /// Open-store records, in input order
    pub records: Vec<EngineeredRecord>,
    /// Rows dropped because the store was closed
    pub closed_rows: Vec<usize>,
}

/// Whole `unit_days` periods from `since` to `date`, rounding toward negative
/// infinity like the training code's timedelta arithmetic
pub fn elapsed_periods(since: NaiveDate, date: NaiveDate, unit_days: i64) -> i64 {
    date.signed_duration_since(since)
        .num_days()
        .div_euclid(unit_days)
}

/// Monday of the given week
pub fn week_monday(year: i32, week: i32, numbering: PromoWeekNumbering) -> Option<NaiveDate> {
    match numbering {
        PromoWeekNumbering::Strftime => {
            let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let from_monday = jan1.weekday().num_days_from_monday() as i64;
            if week == 0 {
                // Week 0 counts back from Jan 1, so it equals week 1 when Jan 1 is a Monday
                return jan1.checked_sub_signed(Duration::days(from_monday));
            }
            let first_monday = jan1 + Duration::days((7 - from_monday) % 7);
            first_monday.checked_add_signed(Duration::days(7 * (week as i64 - 1)))
        }
        PromoWeekNumbering::Iso => {
            NaiveDate::from_isoywd_opt(year, u32::try_from(week).ok()?, Weekday::Mon)
        }
    }
}

fn recode_assortment(
    row: usize,
    code: &str,
    policy: UnknownCodePolicy,
) -> Result<Assortment, FeatureError> {
    match (Assortment::from_code(code), policy) {
        (Some(assortment), _) => Ok(assortment),
        (None, UnknownCodePolicy::Fallback) => {
            warn!("Row {}: unmapped assortment code {:?}, using fallback", row, code);
            Ok(Assortment::FALLBACK)
        }
        (None, UnknownCodePolicy::Reject) => Err(FeatureError::UnknownCode {
            row,
            field: "assortment",
            code: code.to_string(),
        }),
    }
}

fn recode_state_holiday(
    row: usize,
    code: &str,
    policy: UnknownCodePolicy,
) -> Result<StateHoliday, FeatureError> {
    match (StateHoliday::from_code(code), policy) {
        (Some(holiday), _) => Ok(holiday),
        (None, UnknownCodePolicy::Fallback) => {
            debug!("Row {}: state holiday code {:?} treated as regular day", row, code);
            Ok(StateHoliday::FALLBACK)
        }
        (None, UnknownCodePolicy::Reject) => Err(FeatureError::UnknownCode {
            row,
            field: "state_holiday",
            code: code.to_string(),
        }),
    }
}

/// Derive features for a single open-store record
pub fn engineer_record(
    record: CleanRecord,
    config: &PipelineConfig,
) -> Result<EngineeredRecord, FeatureError> {
    let row = record.row;
    let date = record.date;

    let competition_since = u32::try_from(record.competition_open_since_month)
        .ok()
        .and_then(|month| NaiveDate::from_ymd_opt(record.competition_open_since_year, month, 1))
        .ok_or_else(|| FeatureError::InvalidDate {
            row,
            field: "competition_since",
            message: format!(
                "{}-{} is not a calendar month",
                record.competition_open_since_year, record.competition_open_since_month
            ),
        })?;

    let promo_since = week_monday(
        record.promo2_since_year,
        record.promo2_since_week,
        config.promo_week_numbering,
    )
    .and_then(|monday| monday.checked_sub_signed(Duration::days(DAYS_PER_WEEK)))
    .ok_or_else(|| FeatureError::InvalidDate {
        row,
        field: "promo_since",
        message: format!(
            "week {} of {} does not exist",
            record.promo2_since_week, record.promo2_since_year
        ),
    })?;

    let assortment = recode_assortment(row, &record.assortment, config.unknown_codes)?;
    let state_holiday = recode_state_holiday(row, &record.state_holiday, config.unknown_codes)?;

    Ok(EngineeredRecord {
        row,
        store: record.store,
        day_of_week: record.day_of_week,
        date,
        promo: record.promo,
        school_holiday: record.school_holiday,
        store_type: record.store_type,
        assortment,
        state_holiday,
        competition_distance: record.competition_distance,
        competition_open_since_month: record.competition_open_since_month,
        competition_open_since_year: record.competition_open_since_year,
        promo2: record.promo2,
        promo2_since_week: record.promo2_since_week,
        promo2_since_year: record.promo2_since_year,
        is_promo: record.is_promo,
        year: date.year(),
        month: date.month(),
        day: date.day(),
        week_of_year: date.iso_week().week(),
        year_week: date.format("%Y-%W").to_string(),
        competition_since,
        competition_time_month: elapsed_periods(competition_since, date, DAYS_PER_MONTH),
        promo_since,
        promo_time_week: elapsed_periods(promo_since, date, DAYS_PER_WEEK),
    })
}

/// Derive features and drop closed-store rows
pub fn engineer(
    records: Vec<CleanRecord>,
    config: &PipelineConfig,
) -> Result<Engineered, FeatureError> {
    let mut output = Engineered::default();

    for record in records {
        if record.open == Some(0) {
            match config.closed_stores {
                ClosedStorePolicy::PassThrough => {
                    output.closed_rows.push(record.row);
                    continue;
                }
                ClosedStorePolicy::Reject => {
                    return Err(FeatureError::ClosedStore { row: record.row });
                }
            }
        }
        output.records.push(engineer_record(record, config)?);
    }

    debug!(
        "Engineered {} open records, dropped {} closed",
        output.records.len(),
        output.closed_rows.len()
    );
    Ok(output)
}
