//! Sales Forecast Service - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    init_logging(&config)?;

    info!("=== Rossmann Sales Forecast v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Parameters: {}, model: {}",
        config.parameter_dir.display(),
        config.model_path.display()
    );

    run_server(config).await
}
