//! Pregnancy tracking with monotone week advancement.

use serde::{Deserialize, Serialize};

use crate::entities::PregnancyId;

/// Turns per gestational week.
pub const TURNS_PER_WEEK: u32 = 5;

/// Week at which the pregnancy becomes visible (sticky).
pub const VISIBILITY_WEEK: u32 = 12;

/// Week at which gestation ends.
pub const BIRTH_WEEK: u32 = 40;

/// Gestation status. The transition to `Birth` is irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PregnancyStatus {
    #[default]
    Gestating,
    Birth,
}

/// A tracked pregnancy. `current_week` is derived from elapsed turns and
/// never decreases; `is_visible` flips once and never reverts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pregnancy {
    pub id: PregnancyId,
    pub mother_name: String,
    pub father_name: String,
    pub conception_turn: u32,
    /// In-world minute of conception.
    pub conception_time: u64,
    pub current_week: u32,
    pub is_visible: bool,
    pub status: PregnancyStatus,
}

/// What changed during a single advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PregnancyTransition {
    pub week_advanced: bool,
    pub became_visible: bool,
    pub reached_birth: bool,
}

impl Pregnancy {
    /// Start a new pregnancy at week 0.
    pub fn conceive(
        id: PregnancyId,
        mother_name: impl Into<String>,
        father_name: impl Into<String>,
        conception_turn: u32,
        conception_time: u64,
    ) -> Self {
        Self {
            id,
            mother_name: mother_name.into(),
            father_name: father_name.into(),
            conception_turn,
            conception_time,
            current_week: 0,
            is_visible: false,
            status: PregnancyStatus::Gestating,
        }
    }

    /// Advance to the week implied by the current turn.
    ///
    /// The derived week is `(current_turn - conception_turn) / 5` floored;
    /// the stored week never decreases even if the derivation would.
    pub fn advance(&mut self, current_turn: u32) -> PregnancyTransition {
        let mut transition = PregnancyTransition::default();
        if self.status == PregnancyStatus::Birth {
            return transition;
        }

        let derived = current_turn.saturating_sub(self.conception_turn) / TURNS_PER_WEEK;
        if derived > self.current_week {
            self.current_week = derived;
            transition.week_advanced = true;
        }

        if !self.is_visible && self.current_week >= VISIBILITY_WEEK {
            self.is_visible = true;
            transition.became_visible = true;
        }

        if self.current_week >= BIRTH_WEEK {
            self.status = PregnancyStatus::Birth;
            transition.reached_birth = true;
        }

        transition
    }
}
