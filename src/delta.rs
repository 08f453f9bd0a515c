use serde::{Deserialize, Serialize};

use crate::error::{AttributionError, Result};
use crate::model::{DeltaPair, ScorePair};
use crate::stats::round2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// Old and new snapshots must have the same length.
    #[default]
    Strict,
    /// Only the common prefix of the two snapshots is compared.
    Lenient,
}

impl DiffMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

/// Signed percentage change from `old` to `new`, rounded to two decimals.
///
/// A zero `old` yields `0.0` when `new` is also zero and `f64::INFINITY`
/// otherwise.
pub fn percent_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return if new == 0.0 { 0.0 } else { f64::INFINITY };
    }

    round2(((new - old) / old) * 100.0)
}

pub fn evaluate_diff(
    old_scores: &[ScorePair],
    new_scores: &[ScorePair],
    mode: DiffMode,
) -> Result<Vec<DeltaPair>> {
    if mode == DiffMode::Strict && old_scores.len() != new_scores.len() {
        return Err(AttributionError::LengthMismatch {
            context: "score snapshots",
            expected: old_scores.len(),
            actual: new_scores.len(),
        });
    }

    Ok(old_scores
        .iter()
        .zip(new_scores)
        .map(|(old, new)| {
            DeltaPair::new(
                percent_change(old.importance, new.importance),
                percent_change(
                    old.position_weighted_word_count,
                    new.position_weighted_word_count,
                ),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{DiffMode, evaluate_diff, percent_change};
    use crate::error::AttributionError;
    use crate::model::{DeltaPair, ScorePair};

    #[test]
    fn percent_change_handles_zero_baseline() {
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(0.0, 5.0), f64::INFINITY);
        assert_eq!(percent_change(0.0, -5.0), f64::INFINITY);
    }

    #[test]
    fn percent_change_is_signed_and_rounded() {
        assert_eq!(percent_change(10.0, 15.0), 50.0);
        assert_eq!(percent_change(10.0, 5.0), -50.0);
        assert_eq!(percent_change(3.0, 4.0), 33.33);
        assert_eq!(percent_change(0.4, 0.0), -100.0);
    }

    #[test]
    fn percent_change_rounds_ties_to_even() {
        assert_eq!(percent_change(800.0, 801.0), 0.12);
        assert_eq!(percent_change(800.0, 799.0), -0.12);
    }

    #[test]
    fn strict_diff_rejects_length_mismatch() {
        let old = [ScorePair::new(0.5, 0.5)];
        let new = [ScorePair::new(0.5, 0.5), ScorePair::new(0.1, 0.1)];

        let error = evaluate_diff(&old, &new, DiffMode::Strict).expect_err("mismatch");
        assert_eq!(
            error,
            AttributionError::LengthMismatch {
                context: "score snapshots",
                expected: 1,
                actual: 2,
            }
        );
    }

    #[test]
    fn lenient_diff_uses_common_prefix() {
        let old = [ScorePair::new(0.5, 0.2), ScorePair::new(0.0, 0.4)];
        let new = [ScorePair::new(0.25, 0.3)];

        let deltas = evaluate_diff(&old, &new, DiffMode::Lenient).expect("lenient diff");
        assert_eq!(deltas, vec![DeltaPair::new(-50.0, 50.0)]);
    }

    #[test]
    fn components_are_diffed_independently() {
        let old = [ScorePair::new(0.0, 0.5), ScorePair::new(0.2, 0.0)];
        let new = [ScorePair::new(0.3, 0.5), ScorePair::new(0.2, 0.0)];

        let deltas = evaluate_diff(&old, &new, DiffMode::Strict).expect("strict diff");
        assert_eq!(
            deltas,
            vec![DeltaPair::new(f64::INFINITY, 0.0), DeltaPair::new(0.0, 0.0)]
        );
    }
}
