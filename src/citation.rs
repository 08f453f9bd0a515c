//! Bracketed citation markers such as `[3]` inside response sentences.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static CITATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?P<num>\d+)\]").expect("valid citation regex"));

/// Returns the distinct source indices cited by `sentence`, ascending.
///
/// Only the exact form `[<digits>]` counts. Anything else in brackets is
/// ignored, as are digit runs that overflow `usize`.
pub fn extract_citations(sentence: &str) -> BTreeSet<usize> {
    CITATION_PATTERN
        .captures_iter(sentence)
        .filter_map(|captures| captures.name("num"))
        .filter_map(|value| value.as_str().parse::<usize>().ok())
        .collect()
}

pub fn strip_citations(sentence: &str) -> String {
    CITATION_PATTERN.replace_all(sentence, "").into_owned()
}

pub fn count_words_without_citations(sentence: &str) -> usize {
    strip_citations(sentence).split_whitespace().count()
}
