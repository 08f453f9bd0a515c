pub mod diff;
pub mod score;
pub mod summarize;


use anyhow::{Context, Result};
use tracing::info;

use geo_eval::{EngineConfig, ScoreWeights};

use crate::cli::{ConfigArgs, WeightArgs};
use crate::util::read_json;

pub(crate) fn load_config(args: &ConfigArgs) -> Result<EngineConfig> {
    let Some(path) = &args.config else {
        return Ok(EngineConfig::default());
    };

    let config: EngineConfig = read_json(path)?;
    info!(path = %path.display(), "loaded engine config");
    config
        .validated()
        .with_context(|| format!("invalid engine config: {}", path.display()))
}

pub(crate) fn resolve_weights(config: &EngineConfig, args: &WeightArgs) -> Result<ScoreWeights> {
    let importance = args.weight_importance.unwrap_or(config.weights.importance);
    let word_count = args.weight_word_count.unwrap_or(config.weights.word_count);
    ScoreWeights::new(importance, word_count).context("invalid --weight-* flags")
}
