//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::telemetry::REQUEST_ERRORS_TOTAL;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed JSON body: {0}")]
    BadJson(#[from] serde_json::Error),
    #[error("Expected a JSON object or an array of objects")]
    UnexpectedPayload,
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadJson(_) | ApiError::UnexpectedPayload => StatusCode::BAD_REQUEST,
            ApiError::Feature(e) if e.is_data_error() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Feature(_) | ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        metrics::counter!(REQUEST_ERRORS_TOTAL, "status" => status.as_u16().to_string())
            .increment(1);

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
