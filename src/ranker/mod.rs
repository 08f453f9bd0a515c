mod lexrank;
mod stopwords;

pub use lexrank::{LexRankConfig, LexRankRanker, tokenize};
pub use stopwords::is_stopword;

/// Scores response sentences by how central they are to a source corpus.
///
/// Implementations must return exactly one score per candidate, in
/// candidate order, and must be deterministic for fixed inputs. Scores are
/// relative weights; they need not be normalized.
pub trait SentenceRanker: Send + Sync {
    fn rank_sentences(&self, corpus: &[Vec<String>], candidates: &[String]) -> Vec<f64>;
}
