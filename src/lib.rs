//! Citation attribution and scoring for generated answers.
//!
//! A response that cites its sources with `[n]` markers is scored per
//! source on two signals: how relevant the citing sentences are
//! ([`attribution::compute_normalized_importance`]) and how much early text
//! cites the source ([`attribution::compute_position_weighted_word_count`]).
//! The [`chooser`] picks the source to edit, [`delta`] measures how scores
//! moved after the edit, and [`aggregate`] and [`report`] summarize an
//! experiment.
//!
//! Sentence relevance comes from a [`ranker::SentenceRanker`]; the bundled
//! implementation is LexRank.

pub mod aggregate;
pub mod attribution;
pub mod batch;
pub mod chooser;
pub mod citation;
pub mod config;
pub mod delta;
pub mod error;
pub mod model;
pub mod ranker;
pub mod report;
pub mod sentences;
pub mod significance;
mod stats;

pub use aggregate::{SummaryStatistics, summarize, summarize_by_batch};
pub use attribution::Evaluator;
pub use chooser::{NO_DOCUMENT, ScoreWeights, choose_document};
pub use config::EngineConfig;
pub use delta::{DiffMode, evaluate_diff, percent_change};
pub use error::{AttributionError, Result};
pub use model::{DeltaPair, DeltaRow, ExperimentRow, ScorePair, ScoringRow, SnapshotRow};
pub use ranker::{LexRankConfig, LexRankRanker, SentenceRanker};
pub use report::{ReportOptions, render_report};
