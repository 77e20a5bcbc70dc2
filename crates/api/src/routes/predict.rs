//! Prediction Route

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::{FeatureError, RawRecord};
use inference_engine::assemble;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::telemetry::{PIPELINE_SECONDS, REQUESTS_TOTAL, ROWS_CLOSED_TOTAL, ROWS_TOTAL};
use crate::AppState;

/// A request object paired with the record parsed from it
pub type SourcedRecord = (Map<String, Value>, RawRecord);

/// Read a single record object or an array of them. An empty body, `null`,
/// `{}` or `[]` yields no records.
pub fn parse_records(body: &[u8]) -> Result<Vec<SourcedRecord>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let to_record = |row: usize, object: Map<String, Value>| {
        serde_json::from_value::<RawRecord>(Value::Object(object.clone()))
            .map(|record| (object, record))
            .map_err(|e| {
                ApiError::from(FeatureError::MalformedRecord {
                    row,
                    message: e.to_string(),
                })
            })
    };

    match serde_json::from_slice::<Value>(body)? {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Object(map) => Ok(vec![to_record(0, map)?]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(row, item)| match item {
                Value::Object(map) => to_record(row, map),
                _ => Err(ApiError::UnexpectedPayload),
            })
            .collect(),
        _ => Err(ApiError::UnexpectedPayload),
    }
}

/// Forecast sales for one record or a batch
pub async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    metrics::counter!(REQUESTS_TOTAL).increment(1);

    let (sources, records): (Vec<_>, Vec<_>) = parse_records(&body)?.into_iter().unzip();
    if records.is_empty() {
        debug!("Empty prediction request");
        return Ok(Json(json!({})).into_response());
    }

    let start = Instant::now();
    let output = state.pipeline.run(&records)?;
    metrics::histogram!(PIPELINE_SECONDS).record(start.elapsed().as_secs_f64());

    let raw = if output.features.is_empty() {
        Vec::new()
    } else {
        state.predictor.predict(&output.features)?
    };

    metrics::counter!(ROWS_TOTAL).increment(records.len() as u64);
    metrics::counter!(ROWS_CLOSED_TOTAL).increment(output.closed_rows.len() as u64);
    info!(
        "Predicted {} rows ({} closed) in {}ms",
        output.features.len(),
        output.closed_rows.len(),
        start.elapsed().as_millis()
    );

    let response = assemble(sources, &records, &output.features, raw)?;
    Ok(Json(response).into_response())
}
