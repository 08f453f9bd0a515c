use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttributionError {
    #[error("length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("no qualifying rows to {context}")]
    EmptyInput { context: &'static str },

    #[error("invalid score weights: importance={importance}, word_count={word_count}")]
    InvalidWeights { importance: f64, word_count: f64 },
}

pub type Result<T> = std::result::Result<T, AttributionError>;
