use serde::{Deserialize, Serialize};

use crate::error::{AttributionError, Result};
use crate::model::ScorePair;

/// Returned by [`choose_document`] when no source carries a signal.
pub const NO_DOCUMENT: i64 = -1;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Blend of importance and position-weighted word count into one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub importance: f64,
    pub word_count: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            importance: 0.5,
            word_count: 0.5,
        }
    }
}

impl ScoreWeights {
    /// Validates the weights and rescales them to sum to one when they are
    /// off by more than `1e-9`.
    pub fn new(importance: f64, word_count: f64) -> Result<Self> {
        let total = importance + word_count;
        let invalid = !importance.is_finite()
            || !word_count.is_finite()
            || importance < 0.0
            || word_count < 0.0
            || total <= 0.0;
        if invalid {
            return Err(AttributionError::InvalidWeights {
                importance,
                word_count,
            });
        }

        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Ok(Self {
                importance: importance / total,
                word_count: word_count / total,
            });
        }

        Ok(Self {
            importance,
            word_count,
        })
    }

    pub fn combine(&self, importance: f64, word_count: f64) -> f64 {
        self.importance * importance + self.word_count * word_count
    }

    pub fn blend(&self, pair: &ScorePair) -> f64 {
        self.combine(pair.importance, pair.position_weighted_word_count)
    }
}

/// Picks the source with the smallest nonzero score, preferring the highest
/// index on ties.
///
/// Zero (and NaN) scores carry no signal and never win. Returns
/// [`NO_DOCUMENT`] for empty or misaligned input, or when every score is
/// zero. The returned index is 0-based.
pub fn choose_document<S>(sources: &[S], scores: &[f64]) -> i64 {
    if sources.is_empty() || sources.len() != scores.len() {
        return NO_DOCUMENT;
    }

    let mut chosen: Option<(usize, f64)> = None;
    for (index, score) in scores.iter().copied().enumerate() {
        if score == 0.0 || score.is_nan() {
            continue;
        }

        // equal scores fall through, so the later index takes over
        match chosen {
            Some((_, best)) if score > best => {}
            _ => chosen = Some((index, score)),
        }
    }

    chosen
        .and_then(|(index, _)| i64::try_from(index).ok())
        .unwrap_or(NO_DOCUMENT)
}

pub fn choose_by_blended_score<S>(
    sources: &[S],
    pairs: &[ScorePair],
    weights: &ScoreWeights,
) -> i64 {
    let blended = pairs
        .iter()
        .map(|pair| weights.blend(pair))
        .collect::<Vec<f64>>();
    choose_document(sources, &blended)
}
