use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "geo-eval",
    version,
    about = "Citation attribution scoring and edit-experiment evaluation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score each response against its sources and choose a source to edit.
    Score(ScoreArgs),
    /// Turn before/after score snapshots into percentage deltas.
    Diff(DiffArgs),
    /// Summarize experiment rows into a text report or JSON.
    Summarize(SummarizeArgs),
}

/// Flags shared by commands that read an engine configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON engine configuration; flags given on the command line win.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WeightArgs {
    /// Weight of importance in the blended score [default: 0.5]
    #[arg(long)]
    pub weight_importance: Option<f64>,

    /// Weight of position-weighted word count in the blended score [default: 0.5]
    #[arg(long)]
    pub weight_word_count: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// LexRank similarity threshold [default: 0.1]
    #[arg(long, conflicts_with = "continuous")]
    pub threshold: Option<f64>,

    /// Use weighted similarity edges instead of a thresholded graph.
    #[arg(long, default_value_t = false)]
    pub continuous: bool,

    #[arg(long, default_value_t = false)]
    pub fast_power_method: bool,

    #[command(flatten)]
    pub weights: WeightArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Compare only the common prefix when snapshot lengths differ.
    #[arg(long, default_value_t = false)]
    pub lenient: bool,

    /// Assign consecutive batch ids to rows that carry none.
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Name shown in the report title [default: Method]
    #[arg(long)]
    pub method_name: Option<String>,

    #[command(flatten)]
    pub weights: WeightArgs,

    #[arg(long, default_value_t = false)]
    pub by_batch: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Add a sign test and a bootstrap confidence interval for the mean total.
    #[arg(long, default_value_t = false)]
    pub significance: bool,

    /// Bootstrap resamples for the confidence interval; 0 disables it [default: 1000]
    #[arg(long)]
    pub bootstrap_iterations: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Minimum report width [default: 72]
    #[arg(long)]
    pub width: Option<usize>,
}
