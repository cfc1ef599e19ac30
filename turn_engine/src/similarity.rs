//! Token analysis and similarity scoring primitives.
//!
//! Shared by retrieval (TF-IDF style scoring) and memory merging (set
//! overlap over significant words).

use std::collections::HashSet;

/// Common words excluded from token analysis.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "was", "were", "been", "being",
    "you", "your", "they", "them", "their", "then", "than", "this", "that",
    "these", "those", "with", "from", "have", "has", "had", "will", "would",
    "could", "should", "can", "into", "onto", "over", "under", "about",
    "after", "before", "while", "when", "where", "what", "which", "who",
    "whom", "how", "why", "all", "any", "some", "each", "very", "just",
    "there", "here", "she", "her", "him", "his", "its", "our", "out", "now",
    "one", "two", "get", "got", "said", "say", "did", "does", "doing",
];

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Split text into lowercase alphanumeric unigrams.
///
/// Tokens of length <= 2 and stop words are dropped. Order is preserved so
/// bigrams can be derived from adjacency.
pub fn unigrams(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() > 2 && !is_stop_word(token))
        .map(|token| token.to_string())
        .collect()
}

/// Adjacent-pair bigrams over the surviving unigram stream, joined by a
/// single space.
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// The significant-word set of a text, for overlap comparison.
pub fn significant_words(text: &str) -> HashSet<String> {
    unigrams(text).into_iter().collect()
}

/// Set similarity between the significant-word sets of two texts.
///
/// Computed as intersection over the smaller set, so a short fact fully
/// contained in a longer elaboration scores 1.0 rather than being diluted
/// by the extra words. Returns 0.0 when either set is empty.
pub fn overlap_similarity(a: &str, b: &str) -> f32 {
    let set_a = significant_words(a);
    let set_b = significant_words(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let smaller = set_a.len().min(set_b.len());
    intersection as f32 / smaller as f32
}

/// Inverse document frequency: `ln(1 + N/(1+df))`.
///
/// Rare tokens score high; a token appearing in every document still
/// contributes a small positive weight.
pub fn idf(total_docs: usize, doc_frequency: usize) -> f32 {
    (1.0 + total_docs as f32 / (1.0 + doc_frequency as f32)).ln()
}
