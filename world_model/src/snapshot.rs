//! Session snapshots - the persisted save format.
//!
//! A snapshot is the pair of character and world state, serialized as a
//! plain JSON document for export/import and autosave/restore. The engine
//! itself performs no I/O; callers move the JSON to and from storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::Character;
use crate::world_state::GameWorld;

/// Current snapshot schema version.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Errors from snapshot encoding/decoding.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("snapshot deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("unsupported snapshot schema version {found} (expected {SNAPSHOT_SCHEMA_VERSION})")]
    UnsupportedVersion { found: u32 },
}

/// A complete session state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub schema_version: u32,
    pub character: Character,
    pub world: GameWorld,
}

impl SessionSnapshot {
    /// Capture the current session state.
    pub fn capture(character: Character, world: GameWorld) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            character,
            world,
        }
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Serialize)
    }

    /// Restore a session from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(SnapshotError::Deserialize)?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.schema_version,
            });
        }
        Ok(snapshot)
    }
}
