//! Prometheus metrics

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

pub const REQUESTS_TOTAL: &str = "rossmann_requests_total";
pub const ROWS_TOTAL: &str = "rossmann_rows_total";
pub const ROWS_CLOSED_TOTAL: &str = "rossmann_rows_closed_total";
pub const REQUEST_ERRORS_TOTAL: &str = "rossmann_request_errors_total";
pub const PIPELINE_SECONDS: &str = "rossmann_pipeline_seconds";

/// Install the global Prometheus recorder
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus recorder installed");
    Ok(handle)
}
