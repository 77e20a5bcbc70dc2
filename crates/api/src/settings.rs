//! Server configuration

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use feature_engine::PipelineConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an extra configuration file
pub const CONFIG_FILE_ENV: &str = "ROSSMANN_CONFIG";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// Directory holding the transformer artifacts
    pub parameter_dir: PathBuf,
    /// ONNX export of the trained model
    pub model_path: PathBuf,
    /// Maximum log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    /// Builder pre-loaded with defaults
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:5000")?
            .set_default("parameter_dir", "parameter")?
            .set_default("model_path", "model/model_rossmann.onnx")?
            .set_default("log_level", "info")?
            .set_default("log_format", "text")?
            .set_default("metrics_enabled", true)
    }

    /// Defaults, then `config/default.toml`, then the file named by
    /// `ROSSMANN_CONFIG`, then `ROSSMANN__*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder =
            Self::builder()?.add_source(File::with_name("config/default").required(false));

        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(File::with_name(&path));
        }

        builder
            .add_source(
                Environment::with_prefix("ROSSMANN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use feature_engine::{ClosedStorePolicy, PromoWeekNumbering, UnknownCodePolicy};

    #[test]
    fn test_defaults() {
        let config: ServerConfig = ServerConfig::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.parameter_dir, PathBuf::from("parameter"));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.metrics_enabled);
        assert_eq!(config.pipeline.unknown_codes, UnknownCodePolicy::Fallback);
        assert_eq!(config.pipeline.closed_stores, ClosedStorePolicy::PassThrough);
        assert_eq!(config.pipeline.missing_competition_distance, 200_000.0);
    }

    #[test]
    fn test_file_overrides() {
        let toml = r#"
            bind_addr = "127.0.0.1:8080"
            log_format = "json"

            [pipeline]
            unknown_codes = "reject"
            closed_stores = "reject"
            promo_week_numbering = "iso"
        "#;
        let config: ServerConfig = ServerConfig::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.pipeline.unknown_codes, UnknownCodePolicy::Reject);
        assert_eq!(config.pipeline.closed_stores, ClosedStorePolicy::Reject);
        assert_eq!(config.pipeline.promo_week_numbering, PromoWeekNumbering::Iso);
        assert_eq!(config.pipeline.missing_competition_distance, 200_000.0);
    }
}
