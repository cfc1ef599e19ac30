//! # World Model
//!
//! The "World Ledger" crate - the single source of truth for simulation
//! state and its invariants. This crate holds no prompt or AI logic.
//!
//! ## Core Components
//!
//! - **entities**: The character, biological state, and identifier newtypes
//! - **world_state**: World time, lore, memory, known entities, pregnancies,
//!   and the capped hidden registry
//! - **validation**: Delta gating - condition caps, semantic-duplicate
//!   rejection, and bio-modifier clamping
//! - **snapshot**: The persisted JSON save format
//!
//! ## Design Philosophy
//!
//! - **Snapshot-Driven**: State is passed by value through the pipeline;
//!   every stage consumes one snapshot and produces the next
//! - **Invariants Here**: Numeric bounds and dedup rules live next to the
//!   data they protect, not in the callers

pub mod entities;
pub mod snapshot;
pub mod validation;
pub mod world_state;

pub use entities::*;
pub use snapshot::*;
pub use validation::*;
pub use world_state::*;
