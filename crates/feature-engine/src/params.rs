//! Frozen Transformer Parameters

use data_validator::{LabelEncoder, Scaler, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::FeatureError;

pub const COMPETITION_DISTANCE_ARTIFACT: &str = "competition_distance_scaler.json";
pub const COMPETITION_TIME_MONTH_ARTIFACT: &str = "competition_time_month_scaler.json";
pub const PROMO_TIME_WEEK_ARTIFACT: &str = "promo_time_week_scaler.json";
pub const YEAR_ARTIFACT: &str = "year_scaler.json";
pub const STORE_TYPE_ARTIFACT: &str = "store_type_scaler.json";

/// The five transformers fitted alongside the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerSet {
    pub competition_distance: Scaler,
    pub competition_time_month: Scaler,
    pub promo_time_week: Scaler,
    pub year: Scaler,
    pub store_type: LabelEncoder,
}

impl TransformerSet {
    /// Load every artifact from `dir`. Any missing or unusable artifact fails.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let dir = dir.as_ref();
        info!("Loading transformer parameters from {}", dir.display());

        let set = Self {
            competition_distance: load_scaler(dir, COMPETITION_DISTANCE_ARTIFACT)?,
            competition_time_month: load_scaler(dir, COMPETITION_TIME_MONTH_ARTIFACT)?,
            promo_time_week: load_scaler(dir, PROMO_TIME_WEEK_ARTIFACT)?,
            year: load_scaler(dir, YEAR_ARTIFACT)?,
            store_type: {
                let path = dir.join(STORE_TYPE_ARTIFACT);
                let encoder: LabelEncoder = read_artifact(&path)?;
                encoder.validate().map_err(|e| invalid(&path, e))?;
                encoder
            },
        };

        info!(
            "Loaded transformer parameters ({} store types)",
            set.store_type.classes.len()
        );
        Ok(set)
    }
}

fn load_scaler(dir: &Path, name: &str) -> Result<Scaler, FeatureError> {
    let path = dir.join(name);
    let scaler: Scaler = read_artifact(&path)?;
    scaler.validate().map_err(|e| invalid(&path, e))?;
    Ok(scaler)
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, FeatureError> {
    let bytes = std::fs::read(path).map_err(|source| FeatureError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| FeatureError::InvalidArtifact {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn invalid(path: &Path, err: ValidationError) -> FeatureError {
    FeatureError::InvalidArtifact {
        path: PathBuf::from(path),
        message: err.to_string(),
    }
}
