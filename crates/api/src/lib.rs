//! Sales Forecast API Server
//!
//! HTTP front end for the store sales model.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use feature_engine::{SalesPipeline, TransformerSet, FEATURE_DIMENSION};
use inference_engine::{InferenceEngine, Predictor};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
pub mod routes;
pub mod settings;
pub mod telemetry;

pub use error::ApiError;
pub use settings::{LogFormat, ServerConfig};

/// Application state shared across handlers. Built once at startup and never
/// mutated afterwards.
pub struct AppState {
    pub pipeline: SalesPipeline,
    pub predictor: Box<dyn Predictor>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(pipeline: SalesPipeline, predictor: Box<dyn Predictor>) -> Self {
        Self {
            pipeline,
            predictor,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Serve the given Prometheus handle at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub predictor: String,
    pub feature_dimension: usize,
    pub store_types: Vec<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rossmann/predict", post(routes::predict::predict))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        predictor: state.predictor.backend().to_string(),
        feature_dimension: FEATURE_DIMENSION,
        store_types: state.pipeline.transformers().store_type.classes.clone(),
    })
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level: Level = config.log_level.parse()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    match config.log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

/// Load every startup artifact. Any failure aborts startup.
pub fn build_state(config: &ServerConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let transformers = TransformerSet::load(&config.parameter_dir)?;
    let pipeline = SalesPipeline::new(transformers, config.pipeline.clone());
    let predictor = InferenceEngine::load(&config.model_path)?;

    let mut state = AppState::new(pipeline, Box::new(predictor));
    if config.metrics_enabled {
        state = state.with_metrics(telemetry::install_recorder()?);
    }
    Ok(state)
}

/// Run the server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(build_state(&config)?);
    let app = create_router(state);

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
