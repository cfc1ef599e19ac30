//! Turn history - the alternating record of user inputs and model turns.

use serde::{Deserialize, Serialize};

/// Who authored a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

/// One entry in the session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: HistoryRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: HistoryRole::Model, text: text.into() }
    }
}

/// The last `count` model-authored turns, oldest first. Used to widen the
/// retrieval query beyond the current input.
pub fn recent_model_turns(history: &[HistoryEntry], count: usize) -> Vec<&str> {
    let mut turns: Vec<&str> = history
        .iter()
        .rev()
        .filter(|entry| entry.role == HistoryRole::Model)
        .take(count)
        .map(|entry| entry.text.as_str())
        .collect();
    turns.reverse();
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_model_turns_window() {
        let history = vec![
            HistoryEntry::user("one"),
            HistoryEntry::model("first reply"),
            HistoryEntry::user("two"),
            HistoryEntry::model("second reply"),
            HistoryEntry::user("three"),
            HistoryEntry::model("third reply"),
            HistoryEntry::user("four"),
            HistoryEntry::model("fourth reply"),
        ];

        let turns = recent_model_turns(&history, 3);
        assert_eq!(turns, vec!["second reply", "third reply", "fourth reply"]);
    }

    #[test]
    fn test_recent_model_turns_short_history() {
        let history = vec![HistoryEntry::user("hello")];
        assert!(recent_model_turns(&history, 3).is_empty());
    }
}
