//! Significance of the chosen total deltas: a two-sided sign test and a
//! seeded bootstrap 95% confidence interval for the mean.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::aggregate::collect_chosen_deltas;
use crate::chooser::ScoreWeights;
use crate::error::Result;
use crate::model::{DeltaRow, lossless_f64};
use crate::stats::mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    pub bootstrap_iterations: usize,
    pub seed: u64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            bootstrap_iterations: 1000,
            seed: 0xC0FFEE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    #[serde(with = "lossless_f64")]
    pub low: f64,
    #[serde(with = "lossless_f64")]
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceSummary {
    pub n: usize,
    pub wins: usize,
    pub losses: usize,
    #[serde(default)]
    pub sign_test_p_value: Option<f64>,
    #[serde(default)]
    pub mean_total_ci95: Option<ConfidenceInterval>,
}

pub fn assess_significance<R: DeltaRow>(
    rows: &[R],
    weights: &ScoreWeights,
    config: &SignificanceConfig,
) -> Result<SignificanceSummary> {
    let weights = ScoreWeights::new(weights.importance, weights.word_count)?;
    let chosen = collect_chosen_deltas(rows, &weights)?;
    let totals = &chosen.totals;
    let (wins, losses) = sign_counts(totals);

    Ok(SignificanceSummary {
        n: totals.len(),
        wins,
        losses,
        sign_test_p_value: sign_test_two_sided_p_value(totals),
        mean_total_ci95: bootstrap_confidence_interval_95(
            totals,
            config.bootstrap_iterations,
            config.seed,
        ),
    })
}

/// Strictly positive and strictly negative deltas; zeros count as neither.
fn sign_counts(deltas: &[f64]) -> (usize, usize) {
    deltas
        .iter()
        .fold((0, 0), |(wins, losses), delta| match delta.partial_cmp(&0.0) {
            Some(Ordering::Greater) => (wins + 1, losses),
            Some(Ordering::Less) => (wins, losses + 1),
            _ => (wins, losses),
        })
}

/// Exact two-sided sign test on the non-zero deltas. `None` when every
/// delta is zero.
pub fn sign_test_two_sided_p_value(deltas: &[f64]) -> Option<f64> {
    let (wins, losses) = sign_counts(deltas);
    let trials = wins + losses;
    if trials == 0 {
        return None;
    }

    let tail = fair_coin_lower_tail(trials, wins.min(losses));
    Some((2.0 * tail).min(1.0))
}

/// `P(X <= k)` for `X ~ Binomial(trials, 1/2)`, summed term by term from
/// `P(X = 0)` using the ratio between neighbouring coefficients.
fn fair_coin_lower_tail(trials: usize, k: usize) -> f64 {
    let mut term = 0.5_f64.powf(trials as f64);
    let mut tail = term;
    for successes in 0..k.min(trials) {
        term *= (trials - successes) as f64 / (successes + 1) as f64;
        tail += term;
    }
    tail
}

/// Deterministic 64-bit xorshift stream for resampling.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        // zero is a fixed point of the generator
        Self { state: seed.max(1) }
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state % len as u64) as usize
    }
}

/// Percentile bootstrap of the mean. A fixed seed always reproduces the
/// same interval.
pub fn bootstrap_confidence_interval_95(
    deltas: &[f64],
    iterations: usize,
    seed: u64,
) -> Option<ConfidenceInterval> {
    if deltas.is_empty() || iterations == 0 {
        return None;
    }

    let mut rng = XorShift64::new(seed);
    let mut resample = vec![0.0_f64; deltas.len()];
    let mut means = (0..iterations)
        .map(|_| {
            for slot in resample.iter_mut() {
                *slot = deltas[rng.next_index(deltas.len())];
            }
            mean(&resample)
        })
        .collect::<Vec<f64>>();
    means.sort_by(|left, right| left.total_cmp(right));

    Some(ConfidenceInterval {
        low: nearest_rank(&means, 0.025),
        high: nearest_rank(&means, 0.975),
    })
}

/// Value at `fraction` of a sorted, non-empty slice.
fn nearest_rank(sorted: &[f64], fraction: f64) -> f64 {
    let position = ((sorted.len() - 1) as f64 * fraction).round() as usize;
    sorted[position.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::{
        SignificanceConfig, assess_significance, bootstrap_confidence_interval_95,
        sign_test_two_sided_p_value,
    };
    use crate::chooser::ScoreWeights;
    use crate::error::AttributionError;
    use crate::model::{DeltaPair, ExperimentRow};

    #[test]
    fn sign_test_reports_small_p_for_consistent_gains() {
        let deltas = vec![10.0, 8.0, 7.0, 6.0, 9.0, 4.0, 12.0];
        let p_value = sign_test_two_sided_p_value(&deltas).expect("p-value");
        assert!(p_value < 0.05, "unexpected p-value: {p_value}");
    }

    #[test]
    fn sign_test_ignores_zero_deltas() {
        assert_eq!(sign_test_two_sided_p_value(&[0.0, 0.0]), None);
        let balanced = sign_test_two_sided_p_value(&[1.0, -1.0, 0.0]).expect("p-value");
        assert_eq!(balanced, 1.0);
    }

    #[test]
    fn bootstrap_interval_is_deterministic_and_ordered() {
        let deltas = vec![30.0, 25.0, 28.0, 22.0, 27.0, 24.0];
        let first = bootstrap_confidence_interval_95(&deltas, 500, 42).expect("interval");
        let second = bootstrap_confidence_interval_95(&deltas, 500, 42).expect("interval");
        assert_eq!(first, second);
        assert!(first.low <= first.high);
        assert!(first.low >= 22.0 && first.high <= 30.0);
    }

    #[test]
    fn bootstrap_of_constant_deltas_collapses_to_a_point() {
        let interval = bootstrap_confidence_interval_95(&[4.0, 4.0, 4.0], 50, 9).expect("interval");
        assert_eq!(interval.low, 4.0);
        assert_eq!(interval.high, 4.0);
    }

    #[test]
    fn sign_test_matches_exact_binomial_tail() {
        // 4 wins, 1 loss: 2 * (1 + 5) / 32
        let p_value = sign_test_two_sided_p_value(&[1.0, 2.0, 3.0, 4.0, -1.0]).expect("p-value");
        assert!((p_value - 0.375).abs() < 1e-12);
    }

    #[test]
    fn bootstrap_needs_data_and_iterations() {
        assert!(bootstrap_confidence_interval_95(&[], 100, 1).is_none());
        assert!(bootstrap_confidence_interval_95(&[1.0], 0, 1).is_none());
    }

    #[test]
    fn assess_significance_uses_chosen_totals() {
        let rows = vec![
            ExperimentRow {
                deltas: vec![DeltaPair::new(10.0, -10.0)],
                chosen_index: Some(0),
                ..ExperimentRow::default()
            },
            ExperimentRow {
                deltas: vec![DeltaPair::new(0.0, 0.0), DeltaPair::new(20.0, 30.0)],
                chosen_index: Some(1),
                ..ExperimentRow::default()
            },
        ];

        let summary =
            assess_significance(&rows, &ScoreWeights::default(), &SignificanceConfig::default())
                .expect("significance");
        assert_eq!(summary.n, 2);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 0);
        assert_eq!(summary.sign_test_p_value, Some(1.0));
        assert!(summary.mean_total_ci95.is_some());
    }

    #[test]
    fn assess_significance_requires_qualifying_rows() {
        let rows = vec![ExperimentRow {
            deltas: vec![DeltaPair::new(1.0, 1.0)],
            chosen_index: Some(-1),
            ..ExperimentRow::default()
        }];
        let error =
            assess_significance(&rows, &ScoreWeights::default(), &SignificanceConfig::default())
                .expect_err("no qualifying rows");
        assert!(matches!(error, AttributionError::EmptyInput { .. }));
    }
}
