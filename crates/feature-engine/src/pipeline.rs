//! Pipeline Orchestration

use tracing::debug;

use crate::clean::{self, CleanRecord};
use crate::config::PipelineConfig;
use crate::engineer::{self, Engineered};
use crate::error::FeatureError;
use crate::features::FeatureVector;
use crate::params::TransformerSet;
use crate::prepare::{self, OneHot, PreparedBatch};
use crate::record::RawRecord;

/// Result of running every stage over a batch
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Model input rows for open stores, in input order
    pub features: Vec<FeatureVector>,
    /// Rows excluded because the store was closed
    pub closed_rows: Vec<usize>,
    /// State holiday indicators for the feature rows
    pub state_holiday: OneHot,
}

/// Clean → engineer → prepare, with transformers loaded once at startup
#[derive(Debug, Clone)]
pub struct SalesPipeline {
    transformers: TransformerSet,
    config: PipelineConfig,
}

impl SalesPipeline {
    /// Create a pipeline around frozen transformers
    pub fn new(transformers: TransformerSet, config: PipelineConfig) -> Self {
        Self {
            transformers,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn transformers(&self) -> &TransformerSet {
        &self.transformers
    }

    /// Fill nulls and derive the promo-month flag
    pub fn clean(&self, records: &[RawRecord]) -> Result<Vec<CleanRecord>, FeatureError> {
        clean::clean(records, &self.config)
    }

    /// Derive calendar and duration features, dropping closed stores
    pub fn engineer(&self, records: Vec<CleanRecord>) -> Result<Engineered, FeatureError> {
        engineer::engineer(records, &self.config)
    }

    /// Rescale and encode into model inputs
    pub fn prepare(
        &self,
        records: &[engineer::EngineeredRecord],
    ) -> Result<PreparedBatch, FeatureError> {
        prepare::prepare(records, &self.transformers)
    }

    /// Run every stage
    pub fn run(&self, records: &[RawRecord]) -> Result<PipelineOutput, FeatureError> {
        let cleaned = self.clean(records)?;
        let engineered = self.engineer(cleaned)?;
        let prepared = self.prepare(&engineered.records)?;

        let output = PipelineOutput {
            features: prepared.feature_matrix(),
            closed_rows: engineered.closed_rows,
            state_holiday: prepared.state_holiday,
        };
        debug!(
            "Pipeline produced {} feature rows from {} records",
            output.features.len(),
            records.len()
        );
        Ok(output)
    }
}
