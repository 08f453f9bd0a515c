//! LexRank centrality over response sentences.
//!
//! Idf weights come from the source corpus (one bag of words per source
//! document). Response sentences are linked by idf-modified cosine
//! similarity, the graph is turned into a row-stochastic matrix and each
//! connected component is solved with the power method. Scores are left
//! unnormalized, so every component's scores sum to its size.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SentenceRanker;
use super::stopwords::is_stopword;

const ALLCLOSE_RELATIVE_TOLERANCE: f64 = 1e-5;
const ALLCLOSE_ABSOLUTE_TOLERANCE: f64 = 1e-8;

type TermCounts = BTreeMap<String, usize>;
type Matrix = Vec<Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexRankConfig {
    /// Similarity cut-off for a discrete graph. `None` keeps weighted edges.
    pub threshold: Option<f64>,
    /// Square the transition operator after every iteration.
    pub fast_power_method: bool,
    pub max_iterations: usize,
    /// Unseen words get idf `ln(N + 1)` instead of zero.
    pub include_new_words: bool,
}

impl Default for LexRankConfig {
    fn default() -> Self {
        Self {
            threshold: Some(0.1),
            fast_power_method: false,
            max_iterations: 10_000,
            include_new_words: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexRankRanker {
    config: LexRankConfig,
}

impl LexRankRanker {
    pub fn new(config: LexRankConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LexRankConfig {
        &self.config
    }
}

impl SentenceRanker for LexRankRanker {
    fn rank_sentences(&self, corpus: &[Vec<String>], candidates: &[String]) -> Vec<f64> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let idf = IdfTable::from_corpus(corpus, self.config.include_new_words);
        let term_counts = candidates
            .iter()
            .map(|sentence| term_frequencies(sentence))
            .collect::<Vec<TermCounts>>();

        let similarity = similarity_matrix(&term_counts, &idf);
        let transition = match self.config.threshold {
            Some(threshold) => discrete_markov_matrix(&similarity, threshold),
            None => markov_matrix(&similarity),
        };

        let scores = stationary_distribution(
            &transition,
            self.config.fast_power_method,
            self.config.max_iterations,
        );

        debug!(
            candidates = candidates.len(),
            sources = corpus.len(),
            vocabulary = idf.len(),
            "ranked response sentences"
        );
        scores
    }
}

/// Lowercased content tokens of `sentence`.
///
/// Punctuation is removed from every word; numbers, e-mail addresses, URLs
/// and stopwords are dropped. Citation markers reduce to numbers, so they
/// never contribute to similarity.
pub fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .split_whitespace()
        .filter(|word| !looks_like_address(word))
        .filter_map(|word| {
            let cleaned = word
                .chars()
                .filter(|character| character.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>();

            let is_number = cleaned.chars().all(|character| character.is_ascii_digit());
            if cleaned.is_empty() || is_number || is_stopword(&cleaned) {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect()
}

fn looks_like_address(word: &str) -> bool {
    let lowered = word.to_ascii_lowercase();
    lowered.contains("://") || lowered.starts_with("www.") || word.contains('@')
}

fn term_frequencies(sentence: &str) -> TermCounts {
    let mut counts = TermCounts::new();
    for token in tokenize(sentence) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

struct IdfTable {
    scores: HashMap<String, f64>,
    default_score: f64,
}

impl IdfTable {
    fn from_corpus(corpus: &[Vec<String>], include_new_words: bool) -> Self {
        let bags = corpus
            .iter()
            .map(|document| {
                document
                    .iter()
                    .flat_map(|sentence| tokenize(sentence))
                    .collect::<HashSet<String>>()
            })
            .filter(|bag| !bag.is_empty())
            .collect::<Vec<HashSet<String>>>();

        let document_total = bags.len() as f64;
        let default_score = if include_new_words {
            (document_total + 1.0).ln()
        } else {
            0.0
        };

        let mut document_frequency = HashMap::<String, usize>::new();
        for bag in &bags {
            for word in bag {
                *document_frequency.entry(word.clone()).or_insert(0) += 1;
            }
        }

        let scores = document_frequency
            .into_iter()
            .map(|(word, frequency)| (word, (document_total / frequency as f64).ln()))
            .collect();

        Self {
            scores,
            default_score,
        }
    }

    fn get(&self, word: &str) -> f64 {
        self.scores
            .get(word)
            .copied()
            .unwrap_or(self.default_score)
    }

    fn len(&self) -> usize {
        self.scores.len()
    }
}

fn idf_modified_cosine(left: &TermCounts, right: &TermCounts, idf: &IdfTable) -> f64 {
    let mut numerator = 0.0_f64;
    for (word, left_count) in left {
        if let Some(right_count) = right.get(word) {
            let weight = idf.get(word);
            numerator += (*left_count as f64) * (*right_count as f64) * weight * weight;
        }
    }

    if numerator == 0.0 {
        return 0.0;
    }

    let squared_norm = |counts: &TermCounts| {
        counts
            .iter()
            .map(|(word, count)| {
                let tfidf = (*count as f64) * idf.get(word);
                tfidf * tfidf
            })
            .sum::<f64>()
    };

    numerator / (squared_norm(left) * squared_norm(right)).sqrt()
}

fn similarity_matrix(term_counts: &[TermCounts], idf: &IdfTable) -> Matrix {
    let size = term_counts.len();
    let mut matrix = vec![vec![0.0_f64; size]; size];

    for row in 0..size {
        matrix[row][row] = 1.0;
        for column in (row + 1)..size {
            let similarity = idf_modified_cosine(&term_counts[row], &term_counts[column], idf);
            if similarity != 0.0 {
                matrix[row][column] = similarity;
                matrix[column][row] = similarity;
            }
        }
    }

    matrix
}

fn discrete_markov_matrix(similarity: &Matrix, threshold: f64) -> Matrix {
    let discrete = similarity
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| if *value >= threshold { 1.0 } else { 0.0 })
                .collect::<Vec<f64>>()
        })
        .collect::<Matrix>();
    markov_matrix(&discrete)
}

fn markov_matrix(weights: &Matrix) -> Matrix {
    weights
        .iter()
        .map(|row| {
            let row_sum = row.iter().sum::<f64>();
            if row_sum == 0.0 {
                row.clone()
            } else {
                row.iter().map(|value| value / row_sum).collect()
            }
        })
        .collect()
}

fn connected_components(transition: &Matrix) -> Vec<Vec<usize>> {
    let size = transition.len();
    let mut visited = vec![false; size];
    let mut components = Vec::<Vec<usize>>::new();

    for seed in 0..size {
        if visited[seed] {
            continue;
        }

        visited[seed] = true;
        let mut component = Vec::<usize>::new();
        let mut queue = VecDeque::from([seed]);
        while let Some(node) = queue.pop_front() {
            component.push(node);
            for neighbour in 0..size {
                let linked =
                    transition[node][neighbour] != 0.0 || transition[neighbour][node] != 0.0;
                if linked && !visited[neighbour] {
                    visited[neighbour] = true;
                    queue.push_back(neighbour);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components
}

fn stationary_distribution(transition: &Matrix, fast: bool, max_iterations: usize) -> Vec<f64> {
    let mut distribution = vec![0.0_f64; transition.len()];

    for component in connected_components(transition) {
        let sub_matrix = component
            .iter()
            .map(|row| component.iter().map(|column| transition[*row][*column]).collect())
            .collect::<Matrix>();

        let eigenvector = power_method(&sub_matrix, fast, max_iterations);
        for (position, node) in component.iter().enumerate() {
            distribution[*node] = eigenvector[position];
        }
    }

    distribution
}

fn power_method(transition: &Matrix, fast: bool, max_iterations: usize) -> Vec<f64> {
    let mut eigenvector = vec![1.0_f64; transition.len()];
    if eigenvector.len() == 1 {
        return eigenvector;
    }

    let mut operator = transpose(transition);
    for _ in 0..max_iterations {
        let next = multiply_vector(&operator, &eigenvector);
        if all_close(&next, &eigenvector) {
            return next;
        }

        eigenvector = next;
        if fast {
            operator = multiply_matrices(&operator, &operator);
        }
    }

    warn!(
        size = transition.len(),
        max_iterations, "power method hit iteration cap before converging"
    );
    eigenvector
}

fn all_close(candidate: &[f64], reference: &[f64]) -> bool {
    candidate.iter().zip(reference).all(|(value, expected)| {
        (value - expected).abs()
            <= ALLCLOSE_ABSOLUTE_TOLERANCE + ALLCLOSE_RELATIVE_TOLERANCE * expected.abs()
    })
}

fn transpose(matrix: &Matrix) -> Matrix {
    let size = matrix.len();
    (0..size)
        .map(|column| (0..size).map(|row| matrix[row][column]).collect())
        .collect()
}

fn multiply_vector(matrix: &Matrix, vector: &[f64]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(vector).map(|(left, right)| left * right).sum())
        .collect()
}

fn multiply_matrices(left: &Matrix, right: &Matrix) -> Matrix {
    let size = left.len();
    (0..size)
        .map(|row| {
            (0..size)
                .map(|column| (0..size).map(|k| left[row][k] * right[k][column]).sum())
                .collect()
        })
        .collect()
}
