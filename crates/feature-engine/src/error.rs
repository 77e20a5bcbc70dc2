//! Feature Pipeline Errors

use data_validator::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning raw records into feature vectors
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Record could not be read into the expected schema
    #[error("Malformed record at row {row}: {message}")]
    MalformedRecord { row: usize, message: String },

    /// Field failed range validation or encoding
    #[error("Row {row}: {source}")]
    Validation {
        row: usize,
        #[source]
        source: ValidationError,
    },

    /// Fields do not form a calendar date
    #[error("Row {row}: invalid {field}: {message}")]
    InvalidDate {
        row: usize,
        field: &'static str,
        message: String,
    },

    /// Closed store in a batch while closed stores are rejected
    #[error("Row {row}: store is closed and closed-store rows are rejected")]
    ClosedStore { row: usize },

    /// Categorical code outside the known set while unknown codes are rejected
    #[error("Row {row}: unknown {field} code {code:?}")]
    UnknownCode {
        row: usize,
        field: &'static str,
        code: String,
    },

    /// Transformer artifact could not be read
    #[error("Failed to read artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transformer artifact is unparsable or unusable
    #[error("Invalid artifact {path}: {message}")]
    InvalidArtifact { path: PathBuf, message: String },
}

impl FeatureError {
    /// Whether the error was caused by request data rather than server state
    pub fn is_data_error(&self) -> bool {
        !matches!(
            self,
            FeatureError::ArtifactIo { .. } | FeatureError::InvalidArtifact { .. }
        )
    }
}
