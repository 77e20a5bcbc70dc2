//! Validation Error Types

use thiserror::Error;

/// Errors raised while validating raw fields or applying frozen transformers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Label never seen when the encoder was fitted
    #[error("Unknown label {label:?} (known: {known:?})")]
    UnknownLabel {
        label: String,
        known: Vec<String>,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
