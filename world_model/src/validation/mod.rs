//! Delta validation - condition gating and bio-modifier clamping.
//!
//! The model cannot be trusted to respect the hard bounds on character
//! state, so every proposed update passes through here regardless of its
//! source. Rejections are policy outcomes, not errors: the offending
//! sub-change is dropped with a notice and the rest of the update proceeds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{
    BioModifiers, Character, CONDITION_HARD_CAP, CONDITION_SOFT_GATE, FERTILITY_CEILING,
    LACTATION_CEILING, METABOLISM_CEILING, STAMINA_CEILING,
};

/// Removals required once the soft gate is tripped.
pub const PRUNE_GATE_REMOVALS: usize = 3;

/// Severity adjectives stripped when deriving a condition's base key.
const SEVERITY_WORDS: [&str; 6] = [
    "agonizing",
    "severe",
    "mild",
    "critical",
    "continuous",
    "active",
];

/// A proposed set of character deltas for one turn.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CharacterUpdates {
    #[serde(default)]
    pub add_conditions: Vec<String>,
    #[serde(default)]
    pub remove_conditions: Vec<String>,
    #[serde(default)]
    pub bio_modifiers: BioModifierUpdate,
    #[serde(default)]
    pub add_inventory: Vec<String>,
    #[serde(default)]
    pub remove_inventory: Vec<String>,
    /// Name -> note, upserted per key.
    #[serde(default)]
    pub relationships: HashMap<String, String>,
    /// Replaces the goal list when present.
    #[serde(default)]
    pub goals: Option<Vec<String>>,
}

impl CharacterUpdates {
    /// Whether the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.add_conditions.is_empty()
            && self.remove_conditions.is_empty()
            && self.bio_modifiers.is_empty()
            && self.add_inventory.is_empty()
            && self.remove_inventory.is_empty()
            && self.relationships.is_empty()
            && self.goals.is_none()
    }
}

/// Partial bio-modifier update; absent fields are left unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct BioModifierUpdate {
    pub metabolism: Option<f32>,
    pub stamina: Option<f32>,
    pub lactation: Option<f32>,
    pub fertility: Option<f32>,
}

impl BioModifierUpdate {
    pub fn is_empty(&self) -> bool {
        self.metabolism.is_none()
            && self.stamina.is_none()
            && self.lactation.is_none()
            && self.fertility.is_none()
    }
}

/// Severity of a validation notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
}

/// A user-visible notice emitted while applying updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl ValidationNotice {
    fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }

    fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, message: message.into() }
    }
}

/// Derive the base key used for semantic-duplicate detection.
///
/// The label is truncated at the first colon or dash, lower-cased, stripped
/// of severity adjectives, and whitespace-collapsed. "Bleeding: severe" and
/// "Severe Bleeding - left arm" both normalize to "bleeding".
pub fn condition_base_key(label: &str) -> String {
    let head = label
        .split(|c| c == ':' || c == '-')
        .next()
        .unwrap_or(label);

    head.to_lowercase()
        .split_whitespace()
        .filter(|word| !SEVERITY_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply a proposed update set to a character, enforcing all invariants.
///
/// Removals are applied before additions are evaluated. Returns the updated
/// character and the notices produced along the way; the input is untouched.
pub fn apply_character_updates(
    character: &Character,
    updates: &CharacterUpdates,
) -> (Character, Vec<ValidationNotice>) {
    let mut next = character.clone();
    let mut notices = Vec::new();

    // Removals first, so "replace, don't stack" swaps resolve in one turn.
    let mut removals_applied = 0usize;
    for label in &updates.remove_conditions {
        if next.remove_condition(label) {
            removals_applied += 1;
            notices.push(ValidationNotice::info(format!("Condition removed: {label}")));
        }
    }

    apply_condition_additions(&mut next, updates, removals_applied, &mut notices);
    apply_bio_modifiers(&mut next.bio.modifiers, &updates.bio_modifiers, &mut notices);

    for item in &updates.add_inventory {
        next.add_item(item.clone());
    }
    for item in &updates.remove_inventory {
        next.remove_item(item);
    }

    for (name, note) in &updates.relationships {
        next.relationships.insert(name.clone(), note.clone());
    }

    if let Some(goals) = &updates.goals {
        next.goals = goals.clone();
    }

    (next, notices)
}

fn apply_condition_additions(
    character: &mut Character,
    updates: &CharacterUpdates,
    removals_applied: usize,
    notices: &mut Vec<ValidationNotice>,
) {
    if updates.add_conditions.is_empty() {
        return;
    }

    let count = character.conditions.len();

    if count >= CONDITION_HARD_CAP {
        notices.push(ValidationNotice::warning(format!(
            "Condition hard cap reached ({count}/{CONDITION_HARD_CAP}): all {} addition(s) rejected",
            updates.add_conditions.len()
        )));
        return;
    }

    if count > CONDITION_SOFT_GATE && removals_applied < PRUNE_GATE_REMOVALS {
        let shortfall = PRUNE_GATE_REMOVALS - removals_applied;
        notices.push(ValidationNotice::warning(format!(
            "Prune gate: {count} conditions active, {removals_applied} removed this turn \
             ({shortfall} more removal(s) required before additions are accepted)"
        )));
        return;
    }

    for label in &updates.add_conditions {
        if character.has_condition(label) {
            notices.push(ValidationNotice::info(format!(
                "Duplicate condition skipped: {label}"
            )));
            continue;
        }

        let base = condition_base_key(label);
        let conflict = character
            .conditions
            .iter()
            .find(|existing| condition_base_key(existing) == base)
            .cloned();

        // Removals ran first, so a conflicting condition that was listed
        // for removal this turn is already gone. Any survivor blocks the
        // addition: replace, don't stack.
        if let Some(existing) = conflict {
            notices.push(ValidationNotice::warning(format!(
                "Semantic duplicate rejected: \"{label}\" overlaps \"{existing}\" \
                 (remove the existing condition to replace it)"
            )));
            continue;
        }

        character.conditions.push(label.clone());
        notices.push(ValidationNotice::success(format!("Condition applied: {label}")));
    }
}

fn apply_bio_modifiers(
    modifiers: &mut BioModifiers,
    update: &BioModifierUpdate,
    notices: &mut Vec<ValidationNotice>,
) {
    let mut set = |target: &mut f32, value: Option<f32>, ceiling: f32, name: &str| {
        if let Some(raw) = value {
            let clamped = BioModifiers::clamp_field(raw, ceiling);
            if (clamped - raw).abs() > f32::EPSILON {
                notices.push(ValidationNotice::info(format!(
                    "{name} modifier clamped from {raw:.2} to {clamped:.2}"
                )));
            }
            *target = clamped;
        }
    };

    set(&mut modifiers.metabolism, update.metabolism, METABOLISM_CEILING, "Metabolism");
    set(&mut modifiers.stamina, update.stamina, STAMINA_CEILING, "Stamina");
    set(&mut modifiers.lactation, update.lactation, LACTATION_CEILING, "Lactation");
    set(&mut modifiers.fertility, update.fertility, FERTILITY_CEILING, "Fertility");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character_with_conditions(count: usize) -> Character {
        let mut character = Character::new("Mara");
        for i in 0..count {
            character.add_condition(format!("Condition {i}"));
        }
        character
    }

    fn updates_adding(labels: &[&str]) -> CharacterUpdates {
        CharacterUpdates {
            add_conditions: labels.iter().map(|s| s.to_string()).collect(),
            ..CharacterUpdates::default()
        }
    }

    #[test]
    fn test_base_key_normalization() {
        assert_eq!(condition_base_key("Bleeding: severe"), "bleeding");
        assert_eq!(condition_base_key("Severe Bleeding - left arm"), "bleeding");
        assert_eq!(condition_base_key("Agonizing   Cramps"), "cramps");
        assert_eq!(condition_base_key("Twisted Ankle"), "twisted ankle");
    }

    #[test]
    fn test_removals_applied_before_additions() {
        let mut character = Character::new("Mara");
        character.add_condition("Bleeding: mild");

        let updates = CharacterUpdates {
            add_conditions: vec!["Bleeding: severe".into()],
            remove_conditions: vec!["Bleeding: mild".into()],
            ..CharacterUpdates::default()
        };

        let (next, _) = apply_character_updates(&character, &updates);
        assert_eq!(next.conditions, vec!["Bleeding: severe".to_string()]);
    }

    #[test]
    fn test_semantic_duplicate_rejected_without_removal() {
        let mut character = Character::new("Mara");
        character.add_condition("Bleeding: mild");

        let (next, notices) =
            apply_character_updates(&character, &updates_adding(&["Severe Bleeding"]));

        assert_eq!(next.conditions, vec!["Bleeding: mild".to_string()]);
        assert!(notices
            .iter()
            .any(|n| n.kind == NoticeKind::Warning && n.message.contains("Semantic duplicate")));
    }

    #[test]
    fn test_exact_duplicate_skipped() {
        let mut character = Character::new("Mara");
        character.add_condition("Soaked");

        let (next, notices) = apply_character_updates(&character, &updates_adding(&["Soaked"]));
        assert_eq!(next.conditions.len(), 1);
        assert!(notices.iter().any(|n| n.message.contains("Duplicate condition skipped")));
    }

    #[test]
    fn test_hard_cap_rejects_all_additions() {
        let character = character_with_conditions(CONDITION_HARD_CAP);

        let (next, notices) = apply_character_updates(&character, &updates_adding(&["Fresh Wound"]));
        assert_eq!(next.conditions.len(), CONDITION_HARD_CAP);
        assert!(!next.has_condition("Fresh Wound"));
        assert!(notices.iter().any(|n| n.message.contains("hard cap")));
    }

    #[test]
    fn test_prune_gate_scenario() {
        // turn=24, conditions=28, removals=1: all additions rejected
        let character = character_with_conditions(28);
        let updates = CharacterUpdates {
            add_conditions: vec!["New Ache".into()],
            remove_conditions: vec!["Condition 3".into()],
            ..CharacterUpdates::default()
        };

        let (next, notices) = apply_character_updates(&character, &updates);
        assert_eq!(next.conditions.len(), 27);
        assert!(!next.has_condition("New Ache"));
        assert!(notices
            .iter()
            .any(|n| n.kind == NoticeKind::Warning && n.message.contains("2 more removal(s)")));
    }

    #[test]
    fn test_prune_gate_satisfied_by_three_removals() {
        let character = character_with_conditions(30);
        let updates = CharacterUpdates {
            add_conditions: vec!["New Ache".into()],
            remove_conditions: vec![
                "Condition 0".into(),
                "Condition 1".into(),
                "Condition 2".into(),
            ],
            ..CharacterUpdates::default()
        };

        let (next, _) = apply_character_updates(&character, &updates);
        assert!(next.has_condition("New Ache"));
    }

    #[test]
    fn test_bio_modifier_clamping() {
        let character = Character::new("Mara");
        let updates = CharacterUpdates {
            bio_modifiers: BioModifierUpdate {
                metabolism: Some(9.0),
                stamina: Some(2.0),
                lactation: Some(0.1),
                fertility: None,
            },
            ..CharacterUpdates::default()
        };

        let (next, _) = apply_character_updates(&character, &updates);
        assert_eq!(next.bio.modifiers.metabolism, 4.0);
        assert_eq!(next.bio.modifiers.stamina, 1.5);
        assert_eq!(next.bio.modifiers.lactation, 0.25);
        // Absent field untouched
        assert_eq!(next.bio.modifiers.fertility, 1.0);
    }

    #[test]
    fn test_inventory_relationships_goals_ungated() {
        let mut character = Character::new("Mara");
        character.add_item("Knife");
        character.goals = vec!["Escape".into()];

        let mut relationships = HashMap::new();
        relationships.insert("Joss".to_string(), "owes a favor".to_string());

        let updates = CharacterUpdates {
            add_inventory: vec!["Rope".into(), "Rope".into()],
            remove_inventory: vec!["Knife".into()],
            relationships,
            goals: Some(vec!["Find the ledger".into()]),
            ..CharacterUpdates::default()
        };

        let (next, _) = apply_character_updates(&character, &updates);
        assert_eq!(next.inventory, vec!["Rope".to_string()]);
        assert_eq!(next.relationships["Joss"], "owes a favor");
        assert_eq!(next.goals, vec!["Find the ledger".to_string()]);
    }
}
