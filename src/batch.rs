//! Row-level helpers that run the engine over many rows at once.
//!
//! Rows are processed in parallel with rayon; output order always matches
//! input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribution::Evaluator;
use crate::chooser::{ScoreWeights, choose_by_blended_score};
use crate::delta::{DiffMode, evaluate_diff};
use crate::error::Result;
use crate::model::{ExperimentRow, ScorePair, ScoringRow, SnapshotRow};
use crate::ranker::SentenceRanker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub scores: Vec<ScorePair>,
    pub chosen_index: i64,
}

/// Evaluates every row and picks the source to edit from the blended scores.
pub fn score_rows<R: SentenceRanker>(
    evaluator: &Evaluator<R>,
    rows: &[ScoringRow],
    weights: &ScoreWeights,
) -> Result<Vec<ScoredRow>> {
    let scored = rows
        .par_iter()
        .map(|row| {
            let scores = evaluator.evaluate(&row.response, &row.sources)?;
            let chosen_index = choose_by_blended_score(&row.sources, &scores, weights);
            Ok(ScoredRow {
                id: row.id.clone(),
                scores,
                chosen_index,
            })
        })
        .collect::<Result<Vec<ScoredRow>>>()?;

    debug!(rows = scored.len(), "scored rows");
    Ok(scored)
}

/// Batch id of the row at `index` when rows are cut into consecutive batches
/// of `batch_size`. A zero size is treated as one.
pub fn batch_id_for(index: usize, batch_size: usize) -> usize {
    index / batch_size.max(1)
}

/// Diffs the before/after snapshots of every row.
///
/// Rows keep their own batch id; rows without one get [`batch_id_for`] when
/// `batch_size` is set.
pub fn diff_rows(
    rows: &[SnapshotRow],
    mode: DiffMode,
    batch_size: Option<usize>,
) -> Result<Vec<ExperimentRow>> {
    let diffed = rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| {
            let deltas = evaluate_diff(&row.scores_before, &row.scores_after, mode)?;
            Ok(ExperimentRow {
                id: row.id.clone(),
                batch_id: row
                    .batch_id
                    .or_else(|| batch_size.map(|size| batch_id_for(index, size))),
                deltas,
                chosen_index: row.chosen_index,
            })
        })
        .collect::<Result<Vec<ExperimentRow>>>()?;

    debug!(rows = diffed.len(), mode = mode.as_str(), "diffed rows");
    Ok(diffed)
}

#[cfg(test)]
mod tests {
    use super::{batch_id_for, diff_rows, score_rows};
    use crate::attribution::Evaluator;
    use crate::chooser::{NO_DOCUMENT, ScoreWeights};
    use crate::delta::DiffMode;
    use crate::error::AttributionError;
    use crate::model::{DeltaPair, ScorePair, ScoringRow, SnapshotRow};
    use crate::ranker::SentenceRanker;

    struct UniformRanker;

    impl SentenceRanker for UniformRanker {
        fn rank_sentences(&self, _corpus: &[Vec<String>], candidates: &[String]) -> Vec<f64> {
            vec![1.0; candidates.len()]
        }
    }

    fn snapshot(
        batch_id: Option<usize>,
        before: &[(f64, f64)],
        after: &[(f64, f64)],
    ) -> SnapshotRow {
        SnapshotRow {
            id: None,
            batch_id,
            scores_before: before.iter().copied().map(ScorePair::from).collect(),
            scores_after: after.iter().copied().map(ScorePair::from).collect(),
            chosen_index: Some(0),
        }
    }

    #[test]
    fn score_rows_keeps_input_order_and_chooses() {
        let rows = vec![
            ScoringRow {
                id: Some("first".to_string()),
                response: "Cats purr [1]. Dogs bark loudly at night [2].".to_string(),
                sources: vec!["Cats purr.".to_string(), "Dogs bark.".to_string()],
            },
            ScoringRow {
                id: Some("second".to_string()),
                response: "Nothing is cited here.".to_string(),
                sources: vec!["Unused.".to_string()],
            },
        ];

        let evaluator = Evaluator::new(UniformRanker);
        let scored =
            score_rows(&evaluator, &rows, &ScoreWeights::default()).expect("rows should score");

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].id.as_deref(), Some("first"));
        assert_eq!(scored[0].scores[0].importance, 0.5);
        assert_eq!(scored[0].scores[1].importance, 0.5);
        // "Cats purr ." is 3 words at position 1; "Dogs bark loudly at night ." is 6 at position 2
        assert_eq!(scored[0].scores[1].position_weighted_word_count, 1.0);
        assert_eq!(scored[0].chosen_index, 1);
        assert_eq!(scored[1].scores, vec![ScorePair::new(0.0, 0.0)]);
        assert_eq!(scored[1].chosen_index, NO_DOCUMENT);
    }

    #[test]
    fn batch_ids_follow_consecutive_chunks() {
        assert_eq!(batch_id_for(0, 2), 0);
        assert_eq!(batch_id_for(3, 2), 1);
        assert_eq!(batch_id_for(5, 0), 5);
    }

    #[test]
    fn diff_rows_assigns_missing_batch_ids() {
        let rows = vec![
            snapshot(None, &[(0.5, 0.5)], &[(0.75, 0.25)]),
            snapshot(Some(9), &[(0.5, 0.5)], &[(0.5, 0.5)]),
            snapshot(None, &[(0.0, 1.0)], &[(0.2, 1.0)]),
        ];

        let diffed = diff_rows(&rows, DiffMode::Strict, Some(2)).expect("rows should diff");
        assert_eq!(diffed[0].deltas, vec![DeltaPair::new(50.0, -50.0)]);
        assert_eq!(diffed[0].batch_id, Some(0));
        assert_eq!(diffed[1].batch_id, Some(9));
        assert_eq!(diffed[2].batch_id, Some(1));
        assert_eq!(diffed[2].deltas, vec![DeltaPair::new(f64::INFINITY, 0.0)]);
    }

    #[test]
    fn diff_rows_propagates_strict_mismatch() {
        let rows = vec![snapshot(None, &[(0.5, 0.5)], &[])];
        let error = diff_rows(&rows, DiffMode::Strict, None).expect_err("mismatch");
        assert!(matches!(error, AttributionError::LengthMismatch { .. }));

        let lenient = diff_rows(&rows, DiffMode::Lenient, None).expect("lenient diff");
        assert!(lenient[0].deltas.is_empty());
        assert_eq!(lenient[0].batch_id, None);
    }
}
