use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::chooser::ScoreWeights;
use crate::error::{AttributionError, Result};
use crate::model::{DeltaRow, lossless_f64};
use crate::stats::{mean, median, positive_count, positive_rate, round2, sample_std};

/// Batch id given to rows that do not carry one.
pub const DEFAULT_BATCH_ID: usize = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub n: usize,
    #[serde(with = "lossless_f64")]
    pub mean_importance: f64,
    #[serde(with = "lossless_f64")]
    pub mean_word_count: f64,
    #[serde(with = "lossless_f64")]
    pub mean_total: f64,
    #[serde(with = "lossless_f64")]
    pub median_importance: f64,
    #[serde(with = "lossless_f64")]
    pub median_word_count: f64,
    #[serde(with = "lossless_f64")]
    pub median_total: f64,
    #[serde(with = "lossless_f64")]
    pub std_importance: f64,
    #[serde(with = "lossless_f64")]
    pub std_word_count: f64,
    pub positive_rate_importance: f64,
    pub positive_rate_word_count: f64,
    pub positive_rate_total: f64,
    pub weight_importance: f64,
    pub weight_word_count: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_count_total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_count_total: Option<usize>,
}

/// The chosen delta of every qualifying row, split into its components and
/// the weighted total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChosenDeltas {
    pub importance: Vec<f64>,
    pub word_count: Vec<f64>,
    pub totals: Vec<f64>,
}

impl ChosenDeltas {
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Collects `row.deltas[chosen_index]` for every row whose chosen index is
/// in range. Other rows are skipped.
pub fn collect_chosen_deltas<R: DeltaRow>(
    rows: &[R],
    weights: &ScoreWeights,
) -> Result<ChosenDeltas> {
    let mut chosen = ChosenDeltas::default();

    for row in rows {
        let deltas = row.deltas();
        let Some(index) = row
            .chosen_index()
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < deltas.len())
        else {
            continue;
        };

        let delta = deltas[index];
        chosen.importance.push(delta.importance_delta_pct);
        chosen.word_count.push(delta.word_count_delta_pct);
        chosen.totals.push(weights.combine(
            delta.importance_delta_pct,
            delta.word_count_delta_pct,
        ));
    }

    if chosen.is_empty() {
        return Err(AttributionError::EmptyInput {
            context: "summarize",
        });
    }

    Ok(chosen)
}

pub fn summarize<R: DeltaRow>(rows: &[R], weights: &ScoreWeights) -> Result<SummaryStatistics> {
    let weights = ScoreWeights::new(weights.importance, weights.word_count)?;
    let chosen = collect_chosen_deltas(rows, &weights)?;

    let positive_total = positive_count(&chosen.totals);
    Ok(SummaryStatistics {
        n: chosen.len(),
        mean_importance: round2(mean(&chosen.importance)),
        mean_word_count: round2(mean(&chosen.word_count)),
        mean_total: round2(mean(&chosen.totals)),
        median_importance: round2(median(&chosen.importance)),
        median_word_count: round2(median(&chosen.word_count)),
        median_total: round2(median(&chosen.totals)),
        std_importance: round2(sample_std(&chosen.importance)),
        std_word_count: round2(sample_std(&chosen.word_count)),
        positive_rate_importance: round2(positive_rate(&chosen.importance)),
        positive_rate_word_count: round2(positive_rate(&chosen.word_count)),
        positive_rate_total: round2(positive_rate(&chosen.totals)),
        weight_importance: round2(weights.importance),
        weight_word_count: round2(weights.word_count),
        positive_count_total: Some(positive_total),
        negative_count_total: Some(chosen.len() - positive_total),
    })
}

/// Summarizes each batch on its own. Batches without a qualifying row are
/// logged and left out; the call fails only when no batch qualifies.
pub fn summarize_by_batch<R: DeltaRow>(
    rows: &[R],
    weights: &ScoreWeights,
) -> Result<BTreeMap<usize, SummaryStatistics>> {
    let weights = ScoreWeights::new(weights.importance, weights.word_count)?;

    let mut batches = BTreeMap::<usize, Vec<&R>>::new();
    for row in rows {
        batches
            .entry(row.batch_id().unwrap_or(DEFAULT_BATCH_ID))
            .or_default()
            .push(row);
    }

    let mut summaries = BTreeMap::<usize, SummaryStatistics>::new();
    for (batch_id, batch_rows) in batches {
        match summarize(&batch_rows, &weights) {
            Ok(summary) => {
                summaries.insert(batch_id, summary);
            }
            Err(AttributionError::EmptyInput { .. }) => {
                warn!(
                    batch_id,
                    rows = batch_rows.len(),
                    "batch has no rows with a valid chosen index"
                );
            }
            Err(error) => return Err(error),
        }
    }

    if summaries.is_empty() {
        return Err(AttributionError::EmptyInput {
            context: "summarize by batch",
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::{summarize, summarize_by_batch};
    use crate::chooser::ScoreWeights;
    use crate::error::AttributionError;
    use crate::model::{DeltaPair, ExperimentRow};

    fn row(
        batch_id: Option<usize>,
        deltas: &[(f64, f64)],
        chosen_index: Option<i64>,
    ) -> ExperimentRow {
        ExperimentRow {
            id: None,
            batch_id,
            deltas: deltas.iter().copied().map(DeltaPair::from).collect(),
            chosen_index,
        }
    }

    #[test]
    fn summarize_reports_means_rates_and_counts() {
        let rows = vec![
            row(None, &[(10.0, -10.0)], Some(0)),
            row(None, &[(99.0, 99.0), (20.0, 30.0)], Some(1)),
        ];

        let summary = summarize(&rows, &ScoreWeights::default()).expect("summary");
        assert_eq!(summary.n, 2);
        assert_eq!(summary.mean_importance, 15.0);
        assert_eq!(summary.mean_word_count, 10.0);
        assert_eq!(summary.mean_total, 12.5);
        assert_eq!(summary.median_total, 12.5);
        assert_eq!(summary.std_importance, 7.07);
        assert_eq!(summary.std_word_count, 28.28);
        assert_eq!(summary.positive_rate_importance, 1.0);
        assert_eq!(summary.positive_rate_word_count, 0.5);
        assert_eq!(summary.positive_rate_total, 0.5);
        assert_eq!(summary.positive_count_total, Some(1));
        assert_eq!(summary.negative_count_total, Some(1));
        assert_eq!(summary.weight_importance, 0.5);
    }

    #[test]
    fn summarize_skips_rows_without_valid_choice() {
        let rows = vec![
            row(None, &[(10.0, 10.0)], None),
            row(None, &[(10.0, 10.0)], Some(-1)),
            row(None, &[(10.0, 10.0)], Some(1)),
            row(None, &[(4.0, 2.0)], Some(0)),
        ];

        let summary = summarize(&rows, &ScoreWeights::default()).expect("summary");
        assert_eq!(summary.n, 1);
        assert_eq!(summary.mean_total, 3.0);
        assert_eq!(summary.std_importance, 0.0);
        assert_eq!(summary.std_word_count, 0.0);
    }

    #[test]
    fn summarize_rounds_mean_ties_to_even() {
        let rows = vec![
            row(None, &[(0.25, 0.0)], Some(0)),
            row(None, &[(0.0, 0.0)], Some(0)),
        ];

        let summary = summarize(&rows, &ScoreWeights::default()).expect("summary");
        assert_eq!(summary.mean_importance, 0.12);
        assert_eq!(summary.median_importance, 0.12);
    }

    #[test]
    fn summarize_fails_on_empty_input() {
        let error = summarize::<ExperimentRow>(&[], &ScoreWeights::default())
            .expect_err("empty input should fail");
        assert_eq!(
            error,
            AttributionError::EmptyInput {
                context: "summarize"
            }
        );
    }

    #[test]
    fn summarize_renormalizes_weights() {
        let rows = vec![row(None, &[(10.0, 20.0)], Some(0))];
        let weights = ScoreWeights {
            importance: 1.0,
            word_count: 3.0,
        };

        let summary = summarize(&rows, &weights).expect("summary");
        assert_eq!(summary.weight_importance, 0.25);
        assert_eq!(summary.weight_word_count, 0.75);
        assert_eq!(summary.mean_total, 17.5);
    }

    #[test]
    fn summarize_keeps_infinite_deltas() {
        let rows = vec![
            row(None, &[(f64::INFINITY, 10.0)], Some(0)),
            row(None, &[(5.0, 10.0)], Some(0)),
        ];

        let summary = summarize(&rows, &ScoreWeights::default()).expect("summary");
        assert_eq!(summary.mean_importance, f64::INFINITY);
        assert_eq!(summary.mean_word_count, 10.0);
        assert_eq!(summary.positive_rate_total, 1.0);
    }

    #[test]
    fn summarize_by_batch_groups_and_skips_empty_batches() {
        let rows = vec![
            row(Some(1), &[(10.0, 10.0)], Some(0)),
            row(Some(1), &[(-10.0, -10.0)], Some(0)),
            row(Some(2), &[(10.0, 10.0)], Some(-1)),
            row(None, &[(6.0, 2.0)], Some(0)),
        ];

        let summaries = summarize_by_batch(&rows, &ScoreWeights::default()).expect("summaries");
        assert_eq!(summaries.keys().copied().collect::<Vec<usize>>(), vec![0, 1]);
        assert_eq!(summaries[&0].mean_total, 4.0);
        assert_eq!(summaries[&1].n, 2);
        assert_eq!(summaries[&1].mean_total, 0.0);
    }

    #[test]
    fn summarize_by_batch_fails_when_no_batch_qualifies() {
        let rows = vec![row(Some(3), &[(1.0, 1.0)], None)];
        let error =
            summarize_by_batch(&rows, &ScoreWeights::default()).expect_err("nothing qualifies");
        assert!(matches!(error, AttributionError::EmptyInput { .. }));
    }
}
