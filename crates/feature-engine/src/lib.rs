//! Feature Engineering Engine
//!
//! Turns raw store-day records into the feature rows the sales model was
//! trained on: cleaning, calendar/duration engineering, then rescaling and
//! encoding with frozen transformers.

mod clean;
mod config;
mod cyclical;
mod engineer;
mod error;
mod features;
mod params;
mod pipeline;
mod prepare;
mod record;

pub use clean::{clean_record, is_promo_month, month_abbreviation, CleanRecord, MONTH_ABBREVIATIONS};
pub use config::{ClosedStorePolicy, PipelineConfig, PromoWeekNumbering, UnknownCodePolicy};
pub use cyclical::{
    encode as cyclical_encode, DAY_OF_MONTH_PERIOD, DAY_OF_WEEK_PERIOD, MONTH_PERIOD,
    WEEK_OF_YEAR_PERIOD,
};
pub use engineer::{elapsed_periods, week_monday, Engineered, EngineeredRecord};
pub use error::FeatureError;
pub use features::{FeatureVector, FEATURE_COLUMNS, FEATURE_DIMENSION};
pub use params::{
    TransformerSet, COMPETITION_DISTANCE_ARTIFACT, COMPETITION_TIME_MONTH_ARTIFACT,
    PROMO_TIME_WEEK_ARTIFACT, STORE_TYPE_ARTIFACT, YEAR_ARTIFACT,
};
pub use pipeline::{PipelineOutput, SalesPipeline};
pub use prepare::{one_hot_state_holiday, OneHot, PreparedBatch, PreparedRecord};
pub use record::{parse_date, Assortment, RawRecord, StateHoliday};
