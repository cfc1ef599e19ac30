//! The turn response - the structured document produced by the model.
//!
//! Schema validation happens at the boundary that parses the model output;
//! by the time a `TurnResponse` reaches the pipeline, required fields are
//! present and every optional field defaults to a neutral value. The
//! pipeline rejects out-of-policy *values*, never malformed shapes.

use serde::{Deserialize, Serialize};

use world_model::{CharacterUpdates, EntityId, RelationshipLevel, SceneMode};

/// Everything the model reports for a single turn.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TurnResponse {
    /// The narrative prose shown to the player.
    pub narrative: String,

    /// Requested in-world minutes for this turn. Clamped by the pipeline.
    pub time_passed_minutes: Option<i64>,

    /// Whether the character slept this turn (raises the time cap).
    pub slept: bool,

    /// Scene mode for this turn; absent means unchanged.
    pub scene_mode: Option<SceneMode>,

    /// New tension level, 0-100; absent means unchanged.
    pub tension: Option<u8>,

    /// Inputs consumed by the biology collaborator.
    pub biology: BiologyInputs,

    /// Proposed character deltas, gated by the validator.
    pub character_updates: CharacterUpdates,

    /// Combat context; when present it replaces threats and environment.
    pub combat_context: Option<CombatContext>,

    /// Entity upserts, matched by id-or-name.
    pub entity_updates: Vec<EntityUpdate>,

    /// Proposed lore, staged for human approval rather than merged.
    pub new_lore: Vec<LoreCandidate>,

    /// Proposed memory facts, merged with similarity dedup.
    pub new_memories: Vec<String>,

    /// Whether a character made a concrete bargain offer this turn. Resets
    /// the bargain obligation clock.
    pub bargain_offered: bool,

    /// Explicit biological-event flag; no conception roll happens without it.
    pub conception: Option<ConceptionEvent>,

    /// Off-screen world activity for this turn.
    pub world_tick: Option<WorldTick>,

    /// The model's own reasoning, surfaced at the front of the debug log.
    pub thought_process: Option<String>,

    /// Free-text addition to the hidden registry.
    pub hidden_update: Option<String>,
}

/// Structured biological inputs. Interpretation belongs to the biology
/// collaborator; the pipeline only carries them across.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BiologyInputs {
    pub calories_in: f32,
    pub water_in: f32,
    /// Exertion level for the turn, 0.0-1.0.
    pub exertion: f32,
    /// Whether pressure was relieved this turn.
    pub relief: bool,
}

/// Replacement combat context.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CombatContext {
    pub threats: Vec<String>,
    pub environment: String,
}

/// An upsert for the known-entity registry. Absent fields leave the
/// existing record untouched; ledger entries append.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EntityUpdate {
    pub id: Option<EntityId>,
    pub name: String,
    pub role: Option<String>,
    pub location: Option<String>,
    pub relationship_level: Option<RelationshipLevel>,
    pub impression: Option<String>,
    pub leverage: Option<String>,
    pub ledger_append: Vec<String>,
}

/// A proposed lore item awaiting human approval.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoreCandidate {
    pub keyword: String,
    pub content: String,
}

/// The explicit biological-event flag.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConceptionEvent {
    /// Defaults to the player character.
    pub mother: Option<String>,
    pub father: String,
}

/// Off-screen NPC, environment, and threat activity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorldTick {
    pub npc_actions: Vec<NpcAction>,
    pub environment_changes: Vec<String>,
    pub emerging_threats: Vec<EmergingThreat>,
}

impl WorldTick {
    /// Whether the tick carries any activity at all.
    pub fn is_active(&self) -> bool {
        !self.npc_actions.is_empty()
            || !self.environment_changes.is_empty()
            || !self.emerging_threats.is_empty()
    }
}

/// One off-screen NPC action.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NpcAction {
    pub actor: String,
    pub action: String,
    /// Invisible actions fold into the hidden registry instead of the log.
    pub player_visible: bool,
}

/// A threat forming off-screen, with its stated arrival estimate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmergingThreat {
    pub name: String,
    pub eta: String,
    /// The causal hook required by the Origin Gate directive.
    pub origin: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_response_parses_with_defaults() {
        let json = r#"{"narrative": "You wait."}"#;
        let response: TurnResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.narrative, "You wait.");
        assert!(response.time_passed_minutes.is_none());
        assert!(!response.slept);
        assert!(response.character_updates.is_empty());
        assert!(response.world_tick.is_none());
    }

    #[test]
    fn test_structured_response_parses() {
        let json = r#"{
            "narrative": "The gate creaks open.",
            "time_passed_minutes": 45,
            "scene_mode": "TENSION",
            "bargain_offered": true,
            "tension": 55,
            "character_updates": {
                "add_conditions": ["Soaked (90 mins)"],
                "remove_conditions": []
            },
            "entity_updates": [
                {"name": "Rask", "role": "gate guard", "relationship_level": "WARY"}
            ],
            "world_tick": {
                "npc_actions": [
                    {"actor": "Joss", "action": "moves the crates", "player_visible": false}
                ],
                "emerging_threats": [
                    {"name": "The Collector", "eta": "2 days", "origin": "unpaid harbor debt"}
                ]
            }
        }"#;

        let response: TurnResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.time_passed_minutes, Some(45));
        assert_eq!(response.scene_mode, Some(SceneMode::Tension));
        assert!(response.bargain_offered);
        assert_eq!(response.character_updates.add_conditions.len(), 1);
        assert_eq!(response.entity_updates[0].name, "Rask");
        assert!(response.world_tick.as_ref().unwrap().is_active());
    }
}
