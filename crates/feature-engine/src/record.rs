//! Store-Day Records and Categorical Codes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One unprocessed store-day observation as received from a client.
///
/// Field names follow the dataset's column headers (`Store`, `DayOfWeek`, ...);
/// snake_case spellings are accepted as aliases. Columns the pipeline does not
/// use (such as the test-set `Id`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Store", alias = "store", deserialize_with = "de::int")]
    pub store: i64,

    #[serde(rename = "DayOfWeek", alias = "day_of_week", deserialize_with = "de::int")]
    pub day_of_week: i64,

    #[serde(rename = "Date", alias = "date", deserialize_with = "de::date")]
    pub date: NaiveDate,

    /// Required column; a null value counts as open
    #[serde(rename = "Open", alias = "open", deserialize_with = "de::opt_int")]
    pub open: Option<i64>,

    #[serde(rename = "Promo", alias = "promo", deserialize_with = "de::int")]
    pub promo: i64,

    #[serde(rename = "StateHoliday", alias = "state_holiday", deserialize_with = "de::code")]
    pub state_holiday: String,

    #[serde(rename = "SchoolHoliday", alias = "school_holiday", deserialize_with = "de::int")]
    pub school_holiday: i64,

    #[serde(rename = "StoreType", alias = "store_type", deserialize_with = "de::code")]
    pub store_type: String,

    #[serde(rename = "Assortment", alias = "assortment", deserialize_with = "de::code")]
    pub assortment: String,

    #[serde(rename = "CompetitionDistance", alias = "competition_distance", default)]
    pub competition_distance: Option<f64>,

    #[serde(
        rename = "CompetitionOpenSinceMonth",
        alias = "competition_open_since_month",
        default
    )]
    pub competition_open_since_month: Option<f64>,

    #[serde(
        rename = "CompetitionOpenSinceYear",
        alias = "competition_open_since_year",
        default
    )]
    pub competition_open_since_year: Option<f64>,

    #[serde(rename = "Promo2", alias = "promo2", deserialize_with = "de::int")]
    pub promo2: i64,

    #[serde(rename = "Promo2SinceWeek", alias = "promo2_since_week", default)]
    pub promo2_since_week: Option<f64>,

    #[serde(rename = "Promo2SinceYear", alias = "promo2_since_year", default)]
    pub promo2_since_year: Option<f64>,

    #[serde(
        rename = "PromoInterval",
        alias = "promo_interval",
        default,
        deserialize_with = "de::promo_interval"
    )]
    pub promo_interval: Option<String>,
}

/// Product assortment level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assortment {
    Basic,
    Extra,
    Extended,
}

impl Assortment {
    /// Category applied to unmapped codes
    pub const FALLBACK: Assortment = Assortment::Extended;

    /// Map a single-letter dataset code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Assortment::Basic),
            "b" => Some(Assortment::Extra),
            "c" => Some(Assortment::Extended),
            _ => None,
        }
    }

    /// Ordinal used as the model input
    pub fn ordinal(self) -> u8 {
        match self {
            Assortment::Basic => 1,
            Assortment::Extra => 2,
            Assortment::Extended => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Assortment::Basic => "basic",
            Assortment::Extra => "extra",
            Assortment::Extended => "extended",
        }
    }
}

/// State holiday category.
///
/// Variants are declared in label order so that sorting matches the column
/// order of the one-hot encoding used in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateHoliday {
    Christmas,
    EasterHoliday,
    PublicHoliday,
    RegularDay,
}

impl StateHoliday {
    /// Category applied to unmapped codes
    pub const FALLBACK: StateHoliday = StateHoliday::RegularDay;

    /// Map a dataset code; `0` is the dataset's explicit "no holiday" code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(StateHoliday::PublicHoliday),
            "b" => Some(StateHoliday::EasterHoliday),
            "c" => Some(StateHoliday::Christmas),
            "0" => Some(StateHoliday::RegularDay),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateHoliday::Christmas => "christmas",
            StateHoliday::EasterHoliday => "easter_holiday",
            StateHoliday::PublicHoliday => "public_holiday",
            StateHoliday::RegularDay => "regular_day",
        }
    }
}

/// Parse the date representations produced by common JSON exporters
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|datetime| datetime.date())
}

mod de {
    use super::parse_date;
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    impl Number {
        fn integral(self) -> Result<i64, String> {
            match self {
                Number::Int(i) => Ok(i),
                Number::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
                Number::Float(f) => Err(format!("expected an integer, found {}", f)),
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(Number),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateValue {
        Text(String),
        EpochMillis(i64),
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Number::deserialize(d)?.integral().map_err(D::Error::custom)
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Option::<Number>::deserialize(d)?
            .map(Number::integral)
            .transpose()
            .map_err(D::Error::custom)
    }

    pub fn code<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Code::deserialize(d)? {
            Code::Text(s) => Ok(s),
            Code::Number(n) => n.integral().map(|i| i.to_string()).map_err(D::Error::custom),
        }
    }

    pub fn promo_interval<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Option::<Code>::deserialize(d)? {
            None => Ok(None),
            Some(Code::Text(s)) if s.is_empty() || s == "0" => Ok(None),
            Some(Code::Text(s)) => Ok(Some(s)),
            Some(Code::Number(n)) => match n.integral() {
                Ok(0) => Ok(None),
                _ => Err(D::Error::custom("promo interval must be a string or 0")),
            },
        }
    }

    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        match DateValue::deserialize(d)? {
            DateValue::Text(s) => {
                parse_date(&s).ok_or_else(|| D::Error::custom(format!("invalid date {:?}", s)))
            }
            DateValue::EpochMillis(ms) => chrono::DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| D::Error::custom(format!("invalid epoch timestamp {}", ms))),
        }
    }
}
