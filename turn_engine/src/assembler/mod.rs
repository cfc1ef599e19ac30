//! Context assembler - composes the full prompt for the next model call.
//!
//! Pure composition: recent memory, retrieved lore and entities, biological
//! status, pacing guidance, character data, world pressure, the scheduler's
//! directive, fixed behavioral rules, and the raw user input, concatenated
//! in a fixed block order. No state is mutated.

use world_model::{Character, GameWorld, SceneMode};

use crate::config::EngineConfig;
use crate::history::HistoryEntry;
use crate::retrieval::{retrieve_context, RetrievalDebug};
use crate::scheduler::{select_directive, SchedulerInput};

/// Tension above which pacing goes high regardless of keywords.
const HIGH_TENSION_THRESHOLD: u8 = 70;

/// Memory bullets included in the prompt.
const MEMORY_WINDOW: usize = 10;

/// Entities summarized in the world-pressure block.
const PRESSURE_ENTITY_LIMIT: usize = 6;

/// Turns without world-tick activity before the stall warning fires.
const STALL_TURNS: u32 = 4;

/// Case-insensitive markers of a downtime action.
const DOWNTIME_KEYWORDS: &[&str] = &[
    "rest", "sleep", "nap", "relax", "bathe", "wash", "eat", "cook", "wait",
    "camp", "chat", "talk", "cuddle", "linger", "browse",
];

/// Fixed behavioral rules appended to every prompt.
const BEHAVIORAL_RULES: &str = "\
- Stay in third person present tense and never speak for the player.
- Every stated change to time, items, conditions, or relationships must \
appear in the structured response, not only in prose.
- NPCs act from their own wants and information, not the player's.
- Respect established facts; when in doubt, consult the background section.";

/// Pacing guidance selected for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    High,
    Slow,
    Neutral,
}

impl Pacing {
    fn guidance(&self) -> &'static str {
        match self {
            Pacing::High => {
                "PACING: High tension. Short beats, hard consequences, no idle \
                 reflection. The situation moves whether the player does or not."
            }
            Pacing::Slow => {
                "PACING: Downtime. Let the scene breathe; favor texture, small \
                 character moments, and conversation over plot motion."
            }
            Pacing::Neutral => {
                "PACING: Neutral. Advance the scene at a natural rhythm."
            }
        }
    }
}

/// Decide pacing from tension, mode, and the user's wording.
pub fn select_pacing(world: &GameWorld, user_input: &str) -> Pacing {
    if world.tension > HIGH_TENSION_THRESHOLD || world.scene_mode == SceneMode::Combat {
        return Pacing::High;
    }

    let input = user_input.to_lowercase();
    let downtime = DOWNTIME_KEYWORDS
        .iter()
        .any(|keyword| input.contains(keyword));
    if downtime || world.scene_mode == SceneMode::Social {
        return Pacing::Slow;
    }

    Pacing::Neutral
}

/// The assembled prompt plus retrieval diagnostics.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub prompt: String,
    pub retrieval_debug: RetrievalDebug,
    /// Id of the directive injected this turn, if any.
    pub directive_id: Option<&'static str>,
}

/// Compose the full prompt for the next model call.
pub fn build_prompt(
    world: &GameWorld,
    character: &Character,
    history: &[HistoryEntry],
    user_input: &str,
    config: &EngineConfig,
) -> AssembledPrompt {
    let retrieved = retrieve_context(
        user_input,
        history,
        &world.lore,
        &world.known_entities,
        &world.active_threats,
        config.retrieval_limits,
    );

    let directive = select_directive(&SchedulerInput {
        turn: world.turn,
        mode: world.scene_mode,
        turns_since_bargain: world.turns_since_bargain(),
        condition_count: character.conditions.len(),
        entity_count: world.known_entities.len(),
        goal_count: character.goals.len(),
        threat_count: world.threat_count(),
    });

    let mut prompt = String::new();

    let recent = world.recent_memories(MEMORY_WINDOW);
    if !recent.is_empty() {
        prompt.push_str("## Recent Memory\n");
        for memory in recent {
            prompt.push_str(&format!("- {}\n", memory.fact));
        }
        prompt.push('\n');
    }

    if !retrieved.lore.is_empty() {
        prompt.push_str("## Relevant Background\n");
        for entry in &retrieved.lore {
            prompt.push_str(&format!("- [{}] {}\n", entry.keyword, entry.content));
        }
        prompt.push('\n');
    }

    if !retrieved.entities.is_empty() {
        prompt.push_str("## People In Play\n");
        for entity in &retrieved.entities {
            prompt.push_str(&format!(
                "- {} ({}, {}) - {:?}; {}\n",
                entity.name, entity.role, entity.location, entity.relationship_level,
                entity.impression
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str("## Biological Status\n");
    let tags = character.bio.status_tags();
    if !tags.is_empty() {
        prompt.push_str(&format!("Status: {}\n", tags.join(", ")));
    }
    prompt.push_str(&format!(
        "Calories {:.0}, hydration {:.0}, fatigue {:.0}, pressure {:.0}\n",
        character.bio.calories,
        character.bio.hydration,
        character.bio.fatigue,
        character.bio.pressure,
    ));
    let m = &character.bio.modifiers;
    prompt.push_str(&format!(
        "Modifiers: metabolism x{:.2}, stamina x{:.2}, lactation x{:.2}, fertility x{:.2}\n\n",
        m.metabolism, m.stamina, m.lactation, m.fertility,
    ));

    prompt.push_str(select_pacing(world, user_input).guidance());
    prompt.push_str("\n\n");

    prompt.push_str("## Character\n");
    prompt.push_str(&format!("{} - {}\n", character.name, character.description));
    prompt.push_str(&format!("Trauma: {}/100\n", character.trauma));
    if !character.conditions.is_empty() {
        prompt.push_str(&format!("Conditions: {}\n", character.conditions.join(", ")));
    }
    if !character.inventory.is_empty() {
        prompt.push_str(&format!("Inventory: {}\n", character.inventory.join(", ")));
    }
    if !character.goals.is_empty() {
        prompt.push_str(&format!("Goals: {}\n", character.goals.join("; ")));
    }
    if !character.relationships.is_empty() {
        let mut pairs: Vec<String> = character
            .relationships
            .iter()
            .map(|(name, note)| format!("{name}: {note}"))
            .collect();
        pairs.sort();
        prompt.push_str(&format!("Relationships: {}\n", pairs.join("; ")));
    }
    prompt.push('\n');

    push_world_pressure(&mut prompt, world);

    if let Some(rule) = directive {
        prompt.push_str("## Directive\n");
        prompt.push_str(rule.text);
        prompt.push_str("\n\n");
    }

    prompt.push_str("## Rules\n");
    prompt.push_str(BEHAVIORAL_RULES);
    prompt.push_str("\n\n");

    prompt.push_str("## Player Action\n");
    prompt.push_str(user_input);
    prompt.push('\n');

    AssembledPrompt {
        prompt,
        retrieval_debug: retrieved.debug,
        directive_id: directive.map(|rule| rule.id),
    }
}

fn push_world_pressure(prompt: &mut String, world: &GameWorld) {
    let notable = world.notable_entities(PRESSURE_ENTITY_LIMIT);
    let stalled = world.turn > 5
        && world.turn.saturating_sub(world.last_world_tick_turn) >= STALL_TURNS;
    if notable.is_empty() && !stalled {
        return;
    }

    prompt.push_str("## World Pressure\n");
    prompt.push_str(&format!(
        "Time: {} | Scene: {:?} | Tension: {}/100\n",
        world.time.display(),
        world.scene_mode,
        world.tension,
    ));
    for entity in notable {
        prompt.push_str(&format!(
            "- {} ({:?}): {} ledger entries\n",
            entity.name,
            entity.relationship_level,
            entity.ledger.len(),
        ));
    }
    if stalled {
        prompt.push_str(
            "WARNING: the world has shown no off-screen activity for several turns. \
             NPCs and factions must advance their own agendas this turn.\n",
        );
    }
    prompt.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_model::{KnownEntity, LoreEntry, LoreId, MemoryFact, MemoryId, RelationshipLevel};

    fn world_with_content() -> GameWorld {
        let mut world = GameWorld::new();
        world.turn = 8;
        world.last_world_tick_turn = 7;
        world.memory.push(MemoryFact {
            id: MemoryId::new(),
            fact: "Met a guard at the gate".into(),
            timestamp: 10,
        });
        world.lore.push(LoreEntry {
            id: LoreId::new(),
            keyword: "harbor".into(),
            content: "The harbor closes at dusk".into(),
            timestamp: 5,
        });
        world
    }

    #[test]
    fn test_pacing_high_on_tension() {
        let mut world = GameWorld::new();
        world.tension = 80;
        assert_eq!(select_pacing(&world, "I look around"), Pacing::High);
    }

    #[test]
    fn test_pacing_high_in_combat() {
        let mut world = GameWorld::new();
        world.scene_mode = SceneMode::Combat;
        assert_eq!(select_pacing(&world, "I rest"), Pacing::High);
    }

    #[test]
    fn test_pacing_slow_on_downtime_keyword() {
        let world = GameWorld::new();
        assert_eq!(select_pacing(&world, "I Rest by the fire"), Pacing::Slow);
    }

    #[test]
    fn test_pacing_slow_in_social_mode() {
        let mut world = GameWorld::new();
        world.scene_mode = SceneMode::Social;
        assert_eq!(select_pacing(&world, "I approach the bar"), Pacing::Slow);
    }

    #[test]
    fn test_pacing_neutral_otherwise() {
        let world = GameWorld::new();
        assert_eq!(select_pacing(&world, "I open the door"), Pacing::Neutral);
    }

    #[test]
    fn test_prompt_contains_all_blocks() {
        let mut world = world_with_content();
        world.tension = 20;
        let mut character = Character::new("Mara");
        character.bio.calories = 30.0;
        character.add_condition("Soaked");

        let assembled = build_prompt(
            &world,
            &character,
            &[],
            "I head for the harbor",
            &EngineConfig::default(),
        );

        assert!(assembled.prompt.contains("## Recent Memory"));
        assert!(assembled.prompt.contains("Met a guard at the gate"));
        assert!(assembled.prompt.contains("## Relevant Background"));
        assert!(assembled.prompt.contains("HUNGRY"));
        assert!(assembled.prompt.contains("PACING:"));
        assert!(assembled.prompt.contains("Conditions: Soaked"));
        assert!(assembled.prompt.contains("## Rules"));
        assert!(assembled.prompt.trim_end().ends_with("I head for the harbor"));
    }

    #[test]
    fn test_stall_warning_after_quiet_turns() {
        let mut world = world_with_content();
        world.turn = 12;
        world.last_world_tick_turn = 6;

        let assembled = build_prompt(
            &world,
            &Character::new("Mara"),
            &[],
            "I wait",
            &EngineConfig::default(),
        );
        assert!(assembled.prompt.contains("no off-screen activity"));
    }

    #[test]
    fn test_no_stall_warning_early_or_active() {
        let mut world = world_with_content();
        world.turn = 5;
        world.last_world_tick_turn = 0;

        let assembled = build_prompt(
            &world,
            &Character::new("Mara"),
            &[],
            "I wait",
            &EngineConfig::default(),
        );
        assert!(!assembled.prompt.contains("no off-screen activity"));
    }

    #[test]
    fn test_pressure_block_lists_notable_entities() {
        let mut world = world_with_content();
        let mut joss = KnownEntity::new("Joss");
        joss.relationship_level = RelationshipLevel::Allied;
        world.known_entities.push(joss);

        let assembled = build_prompt(
            &world,
            &Character::new("Mara"),
            &[],
            "I scan the room",
            &EngineConfig::default(),
        );
        assert!(assembled.prompt.contains("## World Pressure"));
        assert!(assembled.prompt.contains("Joss"));
    }

    #[test]
    fn test_forming_threat_triggers_logistics_directive() {
        let mut world = world_with_content();
        world.turn = 14; // even turn, floor is 10 here
        for i in 0..12 {
            world.known_entities.push(KnownEntity::new(format!("bystander {i}")));
        }
        world.emerging_threats.push(world_model::EmergingThreatRecord {
            name: "The Collector".into(),
            eta: "2 days".into(),
            origin: None,
        });

        let assembled = build_prompt(
            &world,
            &Character::new("Mara"),
            &[],
            "I move on",
            &EngineConfig::default(),
        );
        assert_eq!(assembled.directive_id, Some("threat-logistics"));
    }

    #[test]
    fn test_directive_injected_when_scheduled() {
        let mut world = world_with_content();
        world.turn = 8; // vocabulary rule: 8 % 4 == 0
        for i in 0..6 {
            // enough population to keep the density rule quiet
            world.known_entities.push(KnownEntity::new(format!("bystander {i}")));
        }
        let assembled = build_prompt(
            &world,
            &Character::new("Mara"),
            &[],
            "I move on",
            &EngineConfig::default(),
        );
        assert_eq!(assembled.directive_id, Some("vocabulary"));
        assert!(assembled.prompt.contains("## Directive"));
    }
}
