//! Per-source credit derived from the citations in a generated response.
//!
//! Two independent signals are computed from the response sentences:
//!
//! - **importance**: each cited sentence's relevance score spread over the
//!   sources it cites, normalized into a distribution over citation
//!   impressions;
//! - **position-weighted word count**: each cited sentence's word count
//!   divided by its 1-indexed position, credited to every source it cites.
//!
//! Sentences without citations never influence either signal. The word-count
//! signal is normalized by its maximum in a separate pass
//! ([`normalize_by_max`]) so the two attributors stay independent.

use std::collections::BTreeMap;

use tracing::debug;

use crate::citation::{count_words_without_citations, extract_citations};
use crate::error::{AttributionError, Result};
use crate::model::ScorePair;
use crate::ranker::SentenceRanker;
use crate::sentences::split_sentences;

/// Credit per 1-indexed source. Sources without credit are absent.
pub type SourceWeights = BTreeMap<usize, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseAttribution {
    pub importance: SourceWeights,
    pub position_weighted_word_count: SourceWeights,
}

pub fn compute_normalized_importance<S: AsRef<str>>(
    sentences: &[S],
    scores: &[f64],
) -> Result<SourceWeights> {
    if sentences.len() != scores.len() {
        return Err(AttributionError::LengthMismatch {
            context: "sentence relevance scores",
            expected: sentences.len(),
            actual: scores.len(),
        });
    }

    let mut accumulated = SourceWeights::new();
    let mut total_weight = 0.0_f64;

    for (sentence, score) in sentences.iter().zip(scores) {
        let citations = extract_citations(sentence.as_ref());
        if citations.is_empty() {
            continue;
        }

        for source in &citations {
            *accumulated.entry(*source).or_insert(0.0) += score;
        }
        total_weight += score * citations.len() as f64;
    }

    if total_weight <= 0.0 {
        return Ok(SourceWeights::new());
    }

    Ok(accumulated
        .into_iter()
        .filter(|(_, weight)| *weight != 0.0)
        .map(|(source, weight)| (source, weight / total_weight))
        .collect())
}

pub fn compute_position_weighted_word_count<S: AsRef<str>>(sentences: &[S]) -> SourceWeights {
    let mut weighted = SourceWeights::new();

    for (position, sentence) in (1_usize..).zip(sentences) {
        let citations = extract_citations(sentence.as_ref());
        if citations.is_empty() {
            continue;
        }

        let weight = count_words_without_citations(sentence.as_ref()) as f64 / position as f64;
        for source in citations {
            *weighted.entry(source).or_insert(0.0) += weight;
        }
    }

    weighted
}

/// Divides every value by the maximum. A non-positive maximum maps every
/// present key to `0.0`.
pub fn normalize_by_max(weights: &SourceWeights) -> SourceWeights {
    let max_value = weights.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_value > 0.0 {
        weights
            .iter()
            .map(|(source, value)| (*source, value / max_value))
            .collect()
    } else {
        weights.keys().map(|source| (*source, 0.0)).collect()
    }
}

pub fn analyze_response<S: AsRef<str>>(
    sentences: &[S],
    scores: &[f64],
) -> Result<ResponseAttribution> {
    Ok(ResponseAttribution {
        importance: compute_normalized_importance(sentences, scores)?,
        position_weighted_word_count: compute_position_weighted_word_count(sentences),
    })
}

/// Lays the two signals out as one [`ScorePair`] per source, in source order.
pub fn score_pairs(
    source_count: usize,
    importance: &SourceWeights,
    normalized_word_count: &SourceWeights,
) -> Vec<ScorePair> {
    (1..=source_count)
        .map(|source| {
            ScorePair::new(
                importance.get(&source).copied().unwrap_or(0.0),
                normalized_word_count.get(&source).copied().unwrap_or(0.0),
            )
        })
        .collect()
}

/// Scores a response against its sources with an injected sentence ranker.
#[derive(Debug, Clone, Default)]
pub struct Evaluator<R> {
    ranker: R,
}

impl<R: SentenceRanker> Evaluator<R> {
    pub fn new(ranker: R) -> Self {
        Self { ranker }
    }

    pub fn ranker(&self) -> &R {
        &self.ranker
    }

    /// Returns one [`ScorePair`] per source, aligned with `sources`.
    pub fn evaluate<S: AsRef<str>>(
        &self,
        response: &str,
        sources: &[S],
    ) -> Result<Vec<ScorePair>> {
        let corpus = sources
            .iter()
            .map(|source| split_sentences(source.as_ref()))
            .collect::<Vec<Vec<String>>>();
        let response_sentences = split_sentences(response);

        let relevance = self.ranker.rank_sentences(&corpus, &response_sentences);
        let attribution = analyze_response(&response_sentences, &relevance)?;
        let normalized_word_count = normalize_by_max(&attribution.position_weighted_word_count);

        debug!(
            sources = sources.len(),
            sentences = response_sentences.len(),
            cited_sources = attribution.position_weighted_word_count.len(),
            "evaluated response attribution"
        );

        Ok(score_pairs(
            sources.len(),
            &attribution.importance,
            &normalized_word_count,
        ))
    }
}
