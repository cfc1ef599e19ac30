//! Character definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::BioState;

/// Hard cap on the number of active conditions.
pub const CONDITION_HARD_CAP: usize = 40;

/// Above this count the prune gate starts demanding removals.
pub const CONDITION_SOFT_GATE: usize = 25;

/// The player character and its accumulated state.
///
/// `conditions` is an ordered sequence of short text labels; order is
/// application order and exact-string duplicates are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub description: String,

    /// Active condition labels, in application order.
    pub conditions: Vec<String>,

    /// Condition label -> in-world minute it was applied.
    #[serde(default)]
    pub condition_timestamps: HashMap<String, u64>,

    /// Carried items, dedup by exact string.
    pub inventory: Vec<String>,

    /// Accumulated trauma, 0-100.
    pub trauma: u8,

    pub bio: BioState,

    /// Name -> relationship note.
    pub relationships: HashMap<String, String>,

    /// Currently active goals.
    pub goals: Vec<String>,
}

impl Character {
    /// Create a new character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            conditions: Vec::new(),
            condition_timestamps: HashMap::new(),
            inventory: Vec::new(),
            trauma: 0,
            bio: BioState::default(),
            relationships: HashMap::new(),
            goals: Vec::new(),
        }
    }

    /// Check for an exact-string condition.
    pub fn has_condition(&self, label: &str) -> bool {
        self.conditions.iter().any(|c| c == label)
    }

    /// Append a condition if no exact duplicate exists. Returns whether it
    /// was added.
    pub fn add_condition(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.has_condition(&label) {
            return false;
        }
        self.conditions.push(label);
        true
    }

    /// Remove a condition and its timestamp. Returns whether it was present.
    pub fn remove_condition(&mut self, label: &str) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c != label);
        self.condition_timestamps.remove(label);
        self.conditions.len() != before
    }

    /// Add an inventory item, dedup by exact string.
    pub fn add_item(&mut self, item: impl Into<String>) {
        let item = item.into();
        if !self.inventory.iter().any(|i| *i == item) {
            self.inventory.push(item);
        }
    }

    /// Remove an inventory item by exact string.
    pub fn remove_item(&mut self, item: &str) {
        self.inventory.retain(|i| i != item);
    }

    /// Clamp a trauma delta into the 0-100 range.
    pub fn apply_trauma_delta(&mut self, delta: i32) {
        let next = self.trauma as i32 + delta;
        self.trauma = next.clamp(0, 100) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character() {
        let character = Character::new("Test Hero");
        assert_eq!(character.name, "Test Hero");
        assert!(character.conditions.is_empty());
        assert_eq!(character.trauma, 0);
    }

    #[test]
    fn test_condition_dedup() {
        let mut character = Character::new("Hero");
        assert!(character.add_condition("Bleeding"));
        assert!(!character.add_condition("Bleeding"));
        assert_eq!(character.conditions.len(), 1);
    }

    #[test]
    fn test_remove_condition_drops_timestamp() {
        let mut character = Character::new("Hero");
        character.add_condition("Bleeding");
        character.condition_timestamps.insert("Bleeding".into(), 120);

        assert!(character.remove_condition("Bleeding"));
        assert!(!character.condition_timestamps.contains_key("Bleeding"));
        assert!(!character.remove_condition("Bleeding"));
    }

    #[test]
    fn test_inventory_set_semantics() {
        let mut character = Character::new("Hero");
        character.add_item("Rope");
        character.add_item("Rope");
        assert_eq!(character.inventory.len(), 1);

        character.remove_item("Rope");
        assert!(character.inventory.is_empty());
    }

    #[test]
    fn test_trauma_clamp() {
        let mut character = Character::new("Hero");
        character.apply_trauma_delta(150);
        assert_eq!(character.trauma, 100);
        character.apply_trauma_delta(-300);
        assert_eq!(character.trauma, 0);
    }
}
