use serde::{Deserialize, Serialize};

use crate::chooser::ScoreWeights;
use crate::delta::DiffMode;
use crate::error::Result;
use crate::ranker::LexRankConfig;
use crate::report::ReportOptions;
use crate::significance::SignificanceConfig;

/// Every tunable of the engine in one place. Missing fields fall back to
/// their defaults, so a partial JSON document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    pub ranker: LexRankConfig,
    pub diff_mode: DiffMode,
    pub significance: SignificanceConfig,
    pub report: ReportOptions,
}

impl EngineConfig {
    /// Checks the blend weights and replaces them with their normalized form.
    pub fn validated(mut self) -> Result<Self> {
        self.weights = ScoreWeights::new(self.weights.importance, self.weights.word_count)?;
        Ok(self)
    }
}
