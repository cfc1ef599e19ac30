//! Banned-name scanning for the model's free-text fields.
//!
//! Certain stock names recur across model outputs regardless of setting and
//! flatten every story into the same cast. Occurrences are marked and
//! logged, never fatal: sanitization is a soft content policy.

/// Names the model must not use, matched on word boundaries.
pub const BANNED_NAMES: &[&str] = &[
    "Elara", "Kael", "Seraphina", "Lyra", "Thorne", "Aria", "Selene", "Ezra",
];

/// Whether `text[start..start+len]` sits on word boundaries.
fn is_word_boundary(text: &str, start: usize, len: usize) -> bool {
    let before_ok = start == 0
        || !text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric());
    let after_ok = !text[start + len..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric());
    before_ok && after_ok
}

/// Scan text for banned names, case-insensitively, on word boundaries.
/// Returns each banned name at most once.
pub fn scan_banned_names(text: &str) -> Vec<&'static str> {
    let haystack = text.to_ascii_lowercase();
    BANNED_NAMES
        .iter()
        .filter(|name| {
            let needle = name.to_ascii_lowercase();
            let mut from = 0;
            while let Some(pos) = haystack[from..].find(&needle) {
                let start = from + pos;
                if is_word_boundary(&haystack, start, needle.len()) {
                    return true;
                }
                from = start + needle.len();
            }
            false
        })
        .copied()
        .collect()
}

/// Mark each banned-name occurrence in place rather than removing it.
pub fn mark_occurrences(text: &str) -> String {
    let mut result = text.to_string();
    for name in scan_banned_names(text) {
        let mut marked = String::with_capacity(result.len());
        let mut rest = result.as_str();
        let needle = name.to_ascii_lowercase();
        loop {
            let lower = rest.to_ascii_lowercase();
            match lower.find(&needle) {
                Some(pos) if is_word_boundary(&lower, pos, needle.len()) => {
                    marked.push_str(&rest[..pos]);
                    marked.push_str(&format!("[BANNED:{}]", &rest[pos..pos + needle.len()]));
                    rest = &rest[pos + needle.len()..];
                }
                Some(pos) => {
                    marked.push_str(&rest[..pos + needle.len()]);
                    rest = &rest[pos + needle.len()..];
                }
                None => {
                    marked.push_str(rest);
                    break;
                }
            }
        }
        result = marked;
    }
    result
}
