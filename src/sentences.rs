//! Regex sentence splitting for responses and source documents.

use std::sync::LazyLock;

use regex::Regex;

// Terminal punctuation followed by whitespace or end of text. Decimals such
// as `3.5` never match because the dot is not followed by whitespace.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("valid sentence boundary regex"));

const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "fig", "approx",
    "cf", "al",
];

/// Splits `text` into trimmed, non-empty sentences in order of appearance.
///
/// A trailing fragment without terminal punctuation is kept as the last
/// sentence. A period that closes a known abbreviation does not end a
/// sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::<String>::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        let segment = &text[start..boundary.start()];
        if boundary.as_str().starts_with('.') && ends_with_abbreviation(segment) {
            continue;
        }

        push_sentence(&mut sentences, &text[start..boundary.end()]);
        start = boundary.end();
    }

    if start < text.len() {
        push_sentence(&mut sentences, &text[start..]);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

fn ends_with_abbreviation(segment: &str) -> bool {
    let Some(last_token) = segment.split_whitespace().last() else {
        return false;
    };

    let normalized = last_token
        .trim_start_matches(|character: char| !character.is_alphanumeric())
        .to_ascii_lowercase();
    ABBREVIATIONS.contains(&normalized.as_str())
}
