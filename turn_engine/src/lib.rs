//! # Turn Engine (The Loom)
//!
//! The "conductor" of the narrative simulation. This crate interfaces with
//! `world_model`, assembles the model prompt from retrieved context, and
//! resolves each model response into the next world state.
//!
//! ## Core Components
//!
//! - **retrieval**: TF-IDF relevance scoring over lore and known entities
//! - **scheduler**: Ordered first-match-wins directive selection
//! - **assembler**: Prompt construction from the fixed block order
//! - **pipeline**: The ordered turn-resolution state transition
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: Every turn is a pure function of its inputs and the
//!   injected RNG; no stage performs I/O
//! - **Non-fatal policy**: Out-of-policy values are dropped with a log entry,
//!   never an error
//! - **Extensible**: Biology is a trait seam; new collaborators slot in
//!   without touching the pipeline order

pub mod assembler;
pub mod biology;
pub mod config;
pub mod history;
pub mod log;
pub mod pipeline;
pub mod response;
pub mod retrieval;
pub mod sanitize;
pub mod scheduler;
pub mod similarity;

pub use assembler::*;
pub use biology::*;
pub use config::*;
pub use history::*;
pub use log::*;
pub use pipeline::*;
pub use response::*;
pub use retrieval::*;
pub use scheduler::*;
