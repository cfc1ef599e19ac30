//! Biological state: metabolic gauges and bounded modifier multipliers.

use serde::{Deserialize, Serialize};

/// Global bounds for every modifier multiplier.
pub const MODIFIER_FLOOR: f32 = 0.25;
pub const MODIFIER_CEILING: f32 = 4.0;

/// Per-field ceilings, tighter than the global ceiling.
pub const METABOLISM_CEILING: f32 = 4.0;
pub const STAMINA_CEILING: f32 = 1.5;
pub const LACTATION_CEILING: f32 = 3.0;
pub const FERTILITY_CEILING: f32 = 2.0;

/// Per-turn decay rate toward the neutral multiplier of 1.0.
pub const DECAY_RATE: f32 = 0.05;

/// Decay multiplier when accelerated recovery is in effect.
pub const ACCELERATED_DECAY_FACTOR: f32 = 3.0;

/// The four bounded modifier multipliers.
///
/// Every field is a multiplier over baseline (1.0 = neutral) and is kept
/// inside `[MODIFIER_FLOOR, MODIFIER_CEILING]` intersected with its own
/// per-field ceiling. A value of exactly 0.0 means the system is disabled
/// and is exempt from decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BioModifiers {
    pub metabolism: f32,
    pub stamina: f32,
    pub lactation: f32,
    pub fertility: f32,
}

impl Default for BioModifiers {
    fn default() -> Self {
        Self {
            metabolism: 1.0,
            stamina: 1.0,
            lactation: 0.0,
            fertility: 1.0,
        }
    }
}

impl BioModifiers {
    /// Clamp a single value to the global bounds and a field ceiling.
    pub fn clamp_field(value: f32, field_ceiling: f32) -> f32 {
        value.clamp(MODIFIER_FLOOR, MODIFIER_CEILING).min(field_ceiling)
    }

    /// Decay one multiplier toward 1.0 without crossing it.
    ///
    /// Values above 1.0 decrease, values below 1.0 increase. A value of
    /// exactly 0.0 marks a disabled system and is returned unchanged.
    pub fn decay_toward_neutral(value: f32, accelerated: bool) -> f32 {
        if value == 0.0 {
            return value;
        }
        let rate = if accelerated {
            DECAY_RATE * ACCELERATED_DECAY_FACTOR
        } else {
            DECAY_RATE
        };
        if value > 1.0 {
            (value - rate).max(1.0)
        } else if value < 1.0 {
            (value + rate).min(1.0)
        } else {
            value
        }
    }

    /// Apply one turn of decay to all four multipliers.
    pub fn decay_all(&mut self, accelerated: bool) {
        self.metabolism = Self::decay_toward_neutral(self.metabolism, accelerated);
        self.stamina = Self::decay_toward_neutral(self.stamina, accelerated);
        self.lactation = Self::decay_toward_neutral(self.lactation, accelerated);
        self.fertility = Self::decay_toward_neutral(self.fertility, accelerated);
    }
}

/// Metabolic gauges plus the modifier multipliers.
///
/// Gauges run 0-100. The status block in the assembled prompt is derived
/// from these via fixed thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioState {
    /// Caloric reserve, 0-100.
    pub calories: f32,
    /// Hydration level, 0-100.
    pub hydration: f32,
    /// Accumulated fatigue, 0-100.
    pub fatigue: f32,
    /// Internal pressure gauge, 0-100.
    pub pressure: f32,
    pub modifiers: BioModifiers,
    /// When set, modifier decay runs at triple rate this turn.
    #[serde(default)]
    pub accelerated_decay: bool,
}

impl Default for BioState {
    fn default() -> Self {
        Self {
            calories: 100.0,
            hydration: 100.0,
            fatigue: 0.0,
            pressure: 0.0,
            modifiers: BioModifiers::default(),
            accelerated_decay: false,
        }
    }
}

impl BioState {
    /// Threshold-triggered status tags for prompt assembly.
    pub fn status_tags(&self) -> Vec<&'static str> {
        let mut tags = Vec::new();
        if self.calories < 15.0 {
            tags.push("STARVING");
        } else if self.calories < 40.0 {
            tags.push("HUNGRY");
        }
        if self.hydration < 15.0 {
            tags.push("DEHYDRATED");
        } else if self.hydration < 40.0 {
            tags.push("THIRSTY");
        }
        if self.fatigue > 85.0 {
            tags.push("EXHAUSTED");
        } else if self.fatigue > 60.0 {
            tags.push("TIRED");
        }
        if self.pressure > 80.0 {
            tags.push("URGENT PRESSURE");
        } else if self.pressure > 55.0 {
            tags.push("PRESSURE BUILDING");
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_field_bounds() {
        assert_eq!(BioModifiers::clamp_field(0.1, STAMINA_CEILING), 0.25);
        assert_eq!(BioModifiers::clamp_field(5.0, METABOLISM_CEILING), 4.0);
        // Field ceiling tighter than the global ceiling wins
        assert_eq!(BioModifiers::clamp_field(2.0, STAMINA_CEILING), 1.5);
        assert_eq!(BioModifiers::clamp_field(3.5, LACTATION_CEILING), 3.0);
    }

    #[test]
    fn test_decay_toward_neutral_from_above() {
        let v = BioModifiers::decay_toward_neutral(1.2, false);
        assert!((v - 1.15).abs() < 1e-6);
        // Never crosses 1.0
        assert_eq!(BioModifiers::decay_toward_neutral(1.02, false), 1.0);
    }

    #[test]
    fn test_decay_toward_neutral_from_below() {
        let v = BioModifiers::decay_toward_neutral(0.8, false);
        assert!((v - 0.85).abs() < 1e-6);
        assert_eq!(BioModifiers::decay_toward_neutral(0.98, false), 1.0);
    }

    #[test]
    fn test_accelerated_decay() {
        let v = BioModifiers::decay_toward_neutral(2.0, true);
        assert!((v - 1.85).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_modifier_never_decays() {
        assert_eq!(BioModifiers::decay_toward_neutral(0.0, false), 0.0);
        assert_eq!(BioModifiers::decay_toward_neutral(0.0, true), 0.0);
    }

    #[test]
    fn test_status_tags() {
        let mut bio = BioState::default();
        assert!(bio.status_tags().is_empty());

        bio.calories = 30.0;
        bio.fatigue = 90.0;
        let tags = bio.status_tags();
        assert!(tags.contains(&"HUNGRY"));
        assert!(tags.contains(&"EXHAUSTED"));

        bio.calories = 10.0;
        assert!(bio.status_tags().contains(&"STARVING"));
    }
}
