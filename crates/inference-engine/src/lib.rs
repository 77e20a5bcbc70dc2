//! Sales Model Inference
//!
//! Runs the trained regression model over feature rows and joins the
//! predictions back onto the request records.

mod engine;
mod response;

pub use engine::InferenceEngine;
pub use response::{assemble, inverse_target, PredictedRecord};

use feature_engine::FeatureVector;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Prediction count mismatch: {features} feature rows, {predictions} predictions")]
    PredictionCountMismatch { features: usize, predictions: usize },
    #[error("Record count mismatch: {sources} request objects, {records} parsed records")]
    RecordCountMismatch { sources: usize, records: usize },
}

/// A regression model over feature rows.
///
/// Returns one raw model output per row, in row order. Outputs are on the
/// log1p scale the model was trained on.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, InferenceError>;

    /// Short name of the backing implementation
    fn backend(&self) -> &str;
}
