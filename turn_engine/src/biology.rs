//! The biology-tick boundary.
//!
//! Metabolic policy (how calories burn, when hunger conditions appear, how
//! pressure builds) lives behind this trait. The pipeline hands it the
//! turn's elapsed time and inputs and folds its outcome into the condition
//! finalize stage; it never inspects the policy itself.

use world_model::BioState;

use crate::response::BiologyInputs;

/// Everything the collaborator may consult for one tick.
#[derive(Debug, Clone, Copy)]
pub struct BiologyTickInput<'a> {
    /// Clamped in-world minutes that passed this turn.
    pub elapsed_minutes: u32,
    /// Tension after this turn's update.
    pub tension: u8,
    pub inputs: &'a BiologyInputs,
    /// Conditions the player manually cleared this turn.
    pub player_cleared_conditions: &'a [String],
    pub bio: &'a BioState,
}

/// The collaborator's verdict for one tick.
#[derive(Debug, Clone, Default)]
pub struct BiologyOutcome {
    /// Replacement bio state (gauges updated, modifiers untouched here).
    pub bio: Option<BioState>,
    pub added_conditions: Vec<String>,
    pub removed_conditions: Vec<String>,
    pub trauma_delta: i32,
    pub logs: Vec<String>,
}

/// External biological-tick collaborator.
pub trait BiologyTick {
    fn tick(&self, input: BiologyTickInput<'_>) -> BiologyOutcome;
}

/// A collaborator that changes nothing beyond honoring player-cleared
/// conditions. Useful for tests and for sessions with biology disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralBiology;

impl BiologyTick for NeutralBiology {
    fn tick(&self, input: BiologyTickInput<'_>) -> BiologyOutcome {
        BiologyOutcome {
            bio: None,
            added_conditions: Vec::new(),
            removed_conditions: input.player_cleared_conditions.to_vec(),
            trauma_delta: 0,
            logs: Vec::new(),
        }
    }
}
