use serde::{Deserialize, Serialize};

use geo_eval::aggregate::SummaryStatistics;
use geo_eval::batch::ScoredRow;
use geo_eval::significance::SignificanceSummary;
use geo_eval::{DiffMode, ExperimentRow, LexRankConfig, ScoreWeights};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub input_path: String,
    pub input_sha256: String,
    pub weights: ScoreWeights,
    pub ranker: LexRankConfig,
    pub row_count: usize,
    pub unchosen_row_count: usize,
    pub rows: Vec<ScoredRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub input_path: String,
    pub input_sha256: String,
    pub diff_mode: DiffMode,
    #[serde(default)]
    pub batch_size: Option<usize>,
    pub row_count: usize,
    pub rows: Vec<ExperimentRow>,
}

/// Rows accepted by `summarize`: a bare array or the output of `diff`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExperimentInput {
    Manifest(DiffManifest),
    Rows(Vec<ExperimentRow>),
}

impl ExperimentInput {
    pub fn into_rows(self) -> Vec<ExperimentRow> {
        match self {
            Self::Manifest(manifest) => manifest.rows,
            Self::Rows(rows) => rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<usize>,
    pub summary: SummaryStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<SignificanceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub input_path: String,
    pub input_sha256: String,
    pub method_name: String,
    pub row_count: usize,
    pub summaries: Vec<SummaryEntry>,
}
