use std::collections::HashSet;
use std::sync::LazyLock;

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "also", "am", "an", "and",
    "any", "are", "aren", "arent", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "cannot", "could", "couldn", "couldnt", "d", "did",
    "didn", "didnt", "do", "does", "doesn", "doesnt", "doing", "don", "dont", "down", "during",
    "each", "either", "else", "ever", "every", "few", "for", "from", "further", "had", "hadn",
    "hadnt", "has", "hasn", "hasnt", "have", "haven", "havent", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is",
    "isn", "isnt", "it", "its", "itself", "just", "ll", "m", "ma", "may", "me", "might", "mightn",
    "more", "most", "must", "mustn", "my", "myself", "needn", "neither", "no", "nor", "not", "now",
    "o", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "re", "s", "same", "shall", "shan", "she", "should", "shouldn", "shouldnt",
    "so", "some", "such", "t", "than", "that", "thats", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "upon", "us", "ve", "very", "was", "wasn", "wasnt", "we", "were",
    "weren", "werent", "what", "when", "where", "whether", "which", "while", "who", "whom",
    "whose", "why", "will", "with", "won", "wont", "would", "wouldn", "wouldnt", "y", "yet", "you",
    "your", "yours", "yourself", "yourselves",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOPWORDS.iter().copied().collect());

/// Expects a lowercased token with punctuation already removed.
pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}
