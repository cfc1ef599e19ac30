//! The hidden registry: an append-only off-screen narrative log.

use serde::{Deserialize, Serialize};

/// Maximum number of non-blank lines retained.
pub const REGISTRY_LINE_CAP: usize = 60;

/// Append-only narrative log, trimmed to the last 60 non-blank lines on
/// every append.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HiddenRegistry {
    lines: Vec<String>,
}

impl HiddenRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block of text, splitting on newlines and dropping blank
    /// lines, then trim to the cap.
    pub fn append(&mut self, text: &str) {
        for line in text.lines() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                self.lines.push(trimmed.to_string());
            }
        }
        if self.lines.len() > REGISTRY_LINE_CAP {
            let excess = self.lines.len() - REGISTRY_LINE_CAP;
            self.lines.drain(..excess);
        }
    }

    /// All retained lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The registry as a single newline-joined block.
    pub fn as_text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_skips_blank_lines() {
        let mut registry = HiddenRegistry::new();
        registry.append("first\n\n   \nsecond");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lines()[0], "first");
        assert_eq!(registry.lines()[1], "second");
    }

    #[test]
    fn test_cap_keeps_newest_lines() {
        let mut registry = HiddenRegistry::new();
        for i in 0..75 {
            registry.append(&format!("line {i}"));
        }
        assert_eq!(registry.len(), REGISTRY_LINE_CAP);
        assert_eq!(registry.lines()[0], "line 15");
        assert_eq!(registry.lines()[REGISTRY_LINE_CAP - 1], "line 74");
    }

    #[test]
    fn test_cap_holds_under_bulk_append() {
        let mut registry = HiddenRegistry::new();
        let block: String = (0..100)
            .map(|i| format!("bulk {i}\n"))
            .collect();
        registry.append(&block);
        assert_eq!(registry.len(), REGISTRY_LINE_CAP);
        assert_eq!(registry.lines()[0], "bulk 40");
    }
}
