use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use geo_eval::aggregate::DEFAULT_BATCH_ID;
use geo_eval::significance::{SignificanceConfig, assess_significance};
use geo_eval::{
    ExperimentRow, ReportOptions, ScoreWeights, render_report, summarize, summarize_by_batch,
};

use crate::cli::SummarizeArgs;
use crate::commands::{load_config, resolve_weights};
use crate::manifest::{ExperimentInput, MANIFEST_VERSION, SummaryEntry, SummaryReport};
use crate::util::{now_utc_string, read_json, sha256_file, write_json_stdout};

pub fn run(args: SummarizeArgs) -> Result<()> {
    let (report, options) = build_report(&args)?;

    if args.json {
        write_json_stdout(&report)?;
    } else {
        let mut output = io::BufWriter::new(io::stdout().lock());
        output.write_all(render_entries(&report, &options).as_bytes())?;
        output.flush()?;
    }

    info!(
        rows = report.row_count,
        summaries = report.summaries.len(),
        "summarize completed"
    );
    Ok(())
}

pub fn build_report(args: &SummarizeArgs) -> Result<(SummaryReport, ReportOptions)> {
    let config = load_config(&args.config)?;
    let weights = resolve_weights(&config, &args.weights)?;

    let mut options = config.report;
    if let Some(method_name) = &args.method_name {
        options.method_name = method_name.clone();
    }
    if let Some(width) = args.width {
        options.width = width;
    }

    let mut significance = config.significance;
    if let Some(iterations) = args.bootstrap_iterations {
        significance.bootstrap_iterations = iterations;
    }
    if let Some(seed) = args.seed {
        significance.seed = seed;
    }
    let significance = args.significance.then_some(significance);

    let input: ExperimentInput = read_json(&args.input)?;
    let rows = input.into_rows();
    info!(
        input = %args.input.display(),
        rows = rows.len(),
        by_batch = args.by_batch,
        "summarizing experiment rows"
    );

    let summaries = if args.by_batch {
        summarize_batches(&rows, &weights, significance.as_ref())
    } else {
        summarize_all(&rows, &weights, significance.as_ref())
    }
    .with_context(|| format!("failed to summarize rows from {}", args.input.display()))?;

    let report = SummaryReport {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        input_path: args.input.display().to_string(),
        input_sha256: sha256_file(&args.input)?,
        method_name: options.method_name.clone(),
        row_count: rows.len(),
        summaries,
    };
    Ok((report, options))
}

fn summarize_all(
    rows: &[ExperimentRow],
    weights: &ScoreWeights,
    significance: Option<&SignificanceConfig>,
) -> geo_eval::Result<Vec<SummaryEntry>> {
    Ok(vec![SummaryEntry {
        batch_id: None,
        summary: summarize(rows, weights)?,
        significance: significance
            .map(|config| assess_significance(rows, weights, config))
            .transpose()?,
    }])
}

fn summarize_batches(
    rows: &[ExperimentRow],
    weights: &ScoreWeights,
    significance: Option<&SignificanceConfig>,
) -> geo_eval::Result<Vec<SummaryEntry>> {
    let mut entries = Vec::new();

    for (batch_id, summary) in summarize_by_batch(rows, weights)? {
        let batch_rows = rows
            .iter()
            .filter(|row| row.batch_id.unwrap_or(DEFAULT_BATCH_ID) == batch_id)
            .collect::<Vec<&ExperimentRow>>();

        entries.push(SummaryEntry {
            batch_id: Some(batch_id),
            summary,
            significance: significance
                .map(|config| assess_significance(&batch_rows, weights, config))
                .transpose()?,
        });
    }

    Ok(entries)
}

pub fn render_entries(report: &SummaryReport, options: &ReportOptions) -> String {
    report
        .summaries
        .iter()
        .map(|entry| {
            let options = match entry.batch_id {
                Some(batch_id) => ReportOptions::new(
                    format!("{} (Batch {batch_id})", options.method_name),
                    options.width,
                ),
                None => options.clone(),
            };
            render_report(&entry.summary, &options, entry.significance.as_ref())
        })
        .collect::<Vec<String>>()
        .join("\n")
}
