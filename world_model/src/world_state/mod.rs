//! World state management - the central structure holding all session data.

mod pregnancy;
mod registry;

pub use pregnancy::*;
pub use registry::*;

use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, LoreId, MemoryId};

/// World time tracking, derived from cumulative in-world minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorldTime {
    /// Total elapsed in-world minutes since session start.
    pub total_minutes: u64,
}

impl WorldTime {
    /// Create a time from total elapsed minutes.
    pub fn from_total_minutes(total_minutes: u64) -> Self {
        Self { total_minutes }
    }

    /// Day number, starting at 1.
    pub fn day(&self) -> u64 {
        self.total_minutes / 1440 + 1
    }

    /// Hour of day, 0-23.
    pub fn hour(&self) -> u8 {
        ((self.total_minutes % 1440) / 60) as u8
    }

    /// Minute of hour, 0-59.
    pub fn minute(&self) -> u8 {
        (self.total_minutes % 60) as u8
    }

    /// Human-readable clock display.
    pub fn display(&self) -> String {
        format!("Day {}, {:02}:{:02}", self.day(), self.hour(), self.minute())
    }

    /// Advance by the given number of minutes.
    pub fn advance(&mut self, minutes: u64) {
        self.total_minutes += minutes;
    }
}

impl std::fmt::Display for WorldTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Scene pacing modes reported by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SceneMode {
    #[default]
    Narrative,
    Social,
    Combat,
    Tension,
}

impl SceneMode {
    /// Non-combat scenes carry no persisted threat list.
    pub fn is_peaceful(&self) -> bool {
        matches!(self, SceneMode::Narrative | SceneMode::Social)
    }
}

/// Relationship levels for known entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationshipLevel {
    Hostile,
    Wary,
    #[default]
    Neutral,
    Friendly,
    Allied,
    Devoted,
}

impl RelationshipLevel {
    /// Levels that make an entity mandatory in every retrieval result.
    pub fn is_high_priority(&self) -> bool {
        matches!(self, RelationshipLevel::Allied | RelationshipLevel::Devoted)
    }
}

/// A lore entry. `keyword` acts as a soft-unique key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreEntry {
    pub id: LoreId,
    pub keyword: String,
    pub content: String,
    /// In-world minute this entry was recorded.
    pub timestamp: u64,
}

/// A remembered fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFact {
    pub id: MemoryId,
    pub fact: String,
    /// In-world minute this fact was recorded.
    pub timestamp: u64,
}

/// A threat forming off-screen. Carried until it surfaces into an active
/// combat threat of the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergingThreatRecord {
    pub name: String,
    /// Stated arrival estimate, free text.
    pub eta: String,
    pub origin: Option<String>,
}

/// An entity the character knows about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownEntity {
    pub id: EntityId,
    pub name: String,
    pub role: String,
    pub location: String,
    pub relationship_level: RelationshipLevel,
    /// The model's running read on this entity.
    pub impression: String,
    /// What the entity holds over the character, if anything.
    pub leverage: String,
    /// Running log of notable interactions.
    #[serde(default)]
    pub ledger: Vec<String>,
}

impl KnownEntity {
    /// Create a minimal entity with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            role: String::new(),
            location: String::new(),
            relationship_level: RelationshipLevel::default(),
            impression: String::new(),
            leverage: String::new(),
            ledger: Vec::new(),
        }
    }

    /// Text used when scoring this entity for retrieval.
    pub fn retrieval_text(&self) -> String {
        let mut text = format!("{} {} {} {}", self.name, self.role, self.location, self.impression);
        for entry in &self.ledger {
            text.push(' ');
            text.push_str(entry);
        }
        text
    }

    /// Whether this entity warrants a line in the world-pressure summary.
    pub fn is_notable(&self) -> bool {
        self.relationship_level != RelationshipLevel::Neutral || self.ledger.len() >= 3
    }
}

/// The complete state of the simulated world at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameWorld {
    pub time: WorldTime,

    /// Accumulated lore, keyword soft-unique.
    pub lore: Vec<LoreEntry>,

    /// Accumulated memory facts.
    pub memory: Vec<MemoryFact>,

    /// Registry of known entities.
    pub known_entities: Vec<KnownEntity>,

    /// Names of currently active threats (combat scenes only).
    pub active_threats: Vec<String>,

    /// Threats forming off-screen, not yet active.
    #[serde(default)]
    pub emerging_threats: Vec<EmergingThreatRecord>,

    /// Current environment description.
    pub environment: String,

    /// Append-only off-screen narrative log, capped to 60 non-blank lines.
    pub hidden_registry: HiddenRegistry,

    pub pregnancies: Vec<Pregnancy>,

    /// Narrative tension, 0-100.
    pub tension: u8,

    pub scene_mode: SceneMode,

    /// Turn index of the most recent world-tick activity. Only advances.
    pub last_world_tick_turn: u32,

    /// Current turn index.
    pub turn: u32,

    /// Turn index of the last bargain offer, if any.
    pub last_bargain_turn: Option<u32>,
}

impl GameWorld {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent `count` memory facts, oldest first.
    pub fn recent_memories(&self, count: usize) -> &[MemoryFact] {
        let start = self.memory.len().saturating_sub(count);
        &self.memory[start..]
    }

    /// Find a known entity by ID or exact name.
    pub fn find_entity(&self, id: EntityId, name: &str) -> Option<usize> {
        self.known_entities
            .iter()
            .position(|e| e.id == id || e.name == name)
    }

    /// Entities worth surfacing in the world-pressure summary.
    pub fn notable_entities(&self, limit: usize) -> Vec<&KnownEntity> {
        self.known_entities
            .iter()
            .filter(|e| e.is_notable())
            .take(limit)
            .collect()
    }

    /// Turns since the last bargain offer, counting from session start if
    /// none has been made.
    pub fn turns_since_bargain(&self) -> u32 {
        match self.last_bargain_turn {
            Some(t) => self.turn.saturating_sub(t),
            None => self.turn,
        }
    }

    /// Threats in play: engaged combat threats plus those still forming
    /// off-screen.
    pub fn threat_count(&self) -> usize {
        self.active_threats.len() + self.emerging_threats.len()
    }

    /// Record world-tick activity; the marker never regresses.
    pub fn mark_world_tick(&mut self, turn: u32) {
        if turn > self.last_world_tick_turn {
            self.last_world_tick_turn = turn;
        }
    }
}
