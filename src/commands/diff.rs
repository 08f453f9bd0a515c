use anyhow::{Context, Result};
use tracing::info;

use geo_eval::batch::diff_rows;
use geo_eval::{DiffMode, SnapshotRow};

use crate::cli::DiffArgs;
use crate::commands::load_config;
use crate::manifest::{DiffManifest, MANIFEST_VERSION};
use crate::util::{emit_json, now_utc_string, read_json, sha256_file};

pub fn run(args: DiffArgs) -> Result<()> {
    let manifest = build_manifest(&args)?;
    emit_json(args.output.as_deref(), &manifest)?;

    if let Some(output) = &args.output {
        info!(path = %output.display(), "wrote diff manifest");
    }
    info!(rows = manifest.row_count, "diff completed");

    Ok(())
}

pub fn build_manifest(args: &DiffArgs) -> Result<DiffManifest> {
    let config = load_config(&args.config)?;
    let diff_mode = if args.lenient {
        DiffMode::Lenient
    } else {
        config.diff_mode
    };

    let rows: Vec<SnapshotRow> = read_json(&args.input)?;
    info!(
        input = %args.input.display(),
        rows = rows.len(),
        mode = diff_mode.as_str(),
        "diffing score snapshots"
    );

    let diffed = diff_rows(&rows, diff_mode, args.batch_size)
        .with_context(|| format!("failed to diff rows from {}", args.input.display()))?;

    Ok(DiffManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        input_path: args.input.display().to_string(),
        input_sha256: sha256_file(&args.input)?,
        diff_mode,
        batch_size: args.batch_size,
        row_count: diffed.len(),
        rows: diffed,
    })
}
