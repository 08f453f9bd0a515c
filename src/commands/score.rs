use anyhow::{Context, Result};
use tracing::{info, warn};

use geo_eval::batch::score_rows;
use geo_eval::{Evaluator, LexRankConfig, LexRankRanker, NO_DOCUMENT, ScoringRow};

use crate::cli::ScoreArgs;
use crate::commands::{load_config, resolve_weights};
use crate::manifest::{MANIFEST_VERSION, ScoreManifest};
use crate::util::{emit_json, now_utc_string, read_json, sha256_file};

pub fn run(args: ScoreArgs) -> Result<()> {
    let manifest = build_manifest(&args)?;
    emit_json(args.output.as_deref(), &manifest)?;

    if let Some(output) = &args.output {
        info!(path = %output.display(), "wrote score manifest");
    }
    info!(
        rows = manifest.row_count,
        unchosen = manifest.unchosen_row_count,
        "score completed"
    );

    Ok(())
}

pub fn build_manifest(args: &ScoreArgs) -> Result<ScoreManifest> {
    let config = load_config(&args.config)?;
    let weights = resolve_weights(&config, &args.weights)?;
    let ranker = resolve_ranker_config(config.ranker, args);

    let rows: Vec<ScoringRow> = read_json(&args.input)?;
    info!(
        input = %args.input.display(),
        rows = rows.len(),
        threshold = ?ranker.threshold,
        "scoring rows"
    );

    let evaluator = Evaluator::new(LexRankRanker::new(ranker.clone()));
    let scored = score_rows(&evaluator, &rows, &weights)
        .with_context(|| format!("failed to score rows from {}", args.input.display()))?;

    let unchosen_row_count = scored
        .iter()
        .filter(|row| row.chosen_index == NO_DOCUMENT)
        .count();
    if unchosen_row_count > 0 {
        warn!(
            rows = unchosen_row_count,
            "rows without any cited source; no document chosen"
        );
    }

    Ok(ScoreManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        input_path: args.input.display().to_string(),
        input_sha256: sha256_file(&args.input)?,
        weights,
        ranker,
        row_count: scored.len(),
        unchosen_row_count,
        rows: scored,
    })
}

fn resolve_ranker_config(mut config: LexRankConfig, args: &ScoreArgs) -> LexRankConfig {
    if args.continuous {
        config.threshold = None;
    } else if let Some(threshold) = args.threshold {
        config.threshold = Some(threshold);
    }
    config.fast_power_method |= args.fast_power_method;
    config
}
