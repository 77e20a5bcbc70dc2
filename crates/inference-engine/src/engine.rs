//! Inference Engine Implementation

use std::path::Path;

use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use tracing::{debug, info};
use tract_onnx::prelude::*;

use crate::{InferenceError, Predictor};

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Log1p-scale sales the mock predicts for a store without promo
const MOCK_BASE_LOG_SALES: f64 = 8.6;
/// Log1p-scale uplift the mock applies on promo days
const MOCK_PROMO_UPLIFT: f64 = 0.3;

enum Backend {
    Onnx(OnnxPlan),
    Mock,
}

/// ONNX model runner for the sales regressor
pub struct InferenceEngine {
    /// Model path
    model_path: String,
    backend: Backend,
}

impl InferenceEngine {
    /// Load an ONNX export of the trained model.
    ///
    /// The graph must take a `[1, 20]` f32 input in feature column order and
    /// produce one value per row.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = model_path.as_ref();
        info!("Loading ONNX model: {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Model loaded successfully");
        Ok(Self {
            model_path: path.display().to_string(),
            backend: Backend::Onnx(plan),
        })
    }

    /// Rule-based stand-in for development and tests: a flat baseline with a
    /// promo uplift
    pub fn mock() -> Self {
        info!("Creating mock inference engine");
        Self {
            model_path: "mock".to_string(),
            backend: Backend::Mock,
        }
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    fn run_onnx(plan: &OnnxPlan, features: &FeatureVector) -> Result<f64, InferenceError> {
        let input: Tensor = tract_ndarray::Array2::from_shape_vec(
            (1, FEATURE_DIMENSION),
            features.to_f32().to_vec(),
        )
        .map_err(|e| InferenceError::InvalidInputShape {
            expected: format!("[1, {}]", FEATURE_DIMENSION),
            actual: e.to_string(),
        })?
        .into();

        let outputs = plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        view.iter()
            .next()
            .map(|&v| v as f64)
            .ok_or_else(|| InferenceError::InvalidInputShape {
                expected: "one value per row".to_string(),
                actual: format!("{:?}", view.shape()),
            })
    }

    fn mock_predict(features: &FeatureVector) -> f64 {
        let promo = features.values[1];
        MOCK_BASE_LOG_SALES + MOCK_PROMO_UPLIFT * promo
    }
}

impl Predictor for InferenceEngine {
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        let start = std::time::Instant::now();

        let predictions = match &self.backend {
            Backend::Onnx(plan) => features
                .iter()
                .map(|row| Self::run_onnx(plan, row))
                .collect::<Result<Vec<_>, _>>()?,
            Backend::Mock => features.iter().map(Self::mock_predict).collect(),
        };

        debug!(
            "Inference over {} rows completed in {}ms",
            features.len(),
            start.elapsed().as_millis()
        );
        Ok(predictions)
    }

    fn backend(&self) -> &str {
        match self.backend {
            Backend::Onnx(_) => "onnx",
            Backend::Mock => "mock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(promo: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[1] = promo;
        FeatureVector { row: 0, values }
    }

    #[test]
    fn test_mock_prediction() {
        let engine = InferenceEngine::mock();
        let predictions = engine.predict(&[row(0.0), row(1.0)]).unwrap();

        assert_eq!(predictions.len(), 2);
        assert!((predictions[0] - MOCK_BASE_LOG_SALES).abs() < 1e-12);
        assert!(predictions[1] > predictions[0]);
        assert_eq!(engine.backend(), "mock");
    }

    #[test]
    fn test_mock_empty_batch() {
        let engine = InferenceEngine::mock();
        assert!(engine.predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_model_fails_to_load() {
        let result = InferenceEngine::load("does/not/exist.onnx");
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }
}
