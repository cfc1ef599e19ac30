//! Turn resolution pipeline - the ordered state transition for one turn.
//!
//! One pass per turn over a fixed stage order; each stage feeds the next
//! and none may be reordered. The pipeline is a pure function of the
//! response, the input snapshots, the turn number, and the injected RNG:
//! it performs no I/O, mutates nothing it was given, and returns fresh
//! snapshots. Policy violations never abort the turn - the offending
//! sub-change is dropped with a log entry and everything else proceeds.

use rand::Rng;
use uuid::Uuid;

use world_model::{
    apply_character_updates, Character, EmergingThreatRecord, EntityId, GameWorld, KnownEntity,
    LoreId, MemoryFact, MemoryId, Pregnancy, PregnancyId, CONDITION_HARD_CAP,
};

use crate::biology::{BiologyTick, BiologyTickInput};
use crate::config::EngineConfig;
use crate::log::{DebugLogEntry, TurnLog};
use crate::response::TurnResponse;
use crate::sanitize::{mark_occurrences, scan_banned_names};
use crate::similarity::overlap_similarity;

/// A proposed lore item staged for human approval. The pipeline never
/// merges lore directly; approval, edit, and rejection live in the UI.
#[derive(Debug, Clone)]
pub struct PendingLore {
    pub id: LoreId,
    pub keyword: String,
    pub content: String,
    /// In-world minute the item was staged.
    pub timestamp: u64,
}

/// The result of resolving one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub world: GameWorld,
    pub character: Character,
    /// Ordered trace of every decision, model reasoning first.
    pub debug_log: Vec<DebugLogEntry>,
    pub pending_lore: Vec<PendingLore>,
}

/// The orchestrator. Holds tuning only; all state flows through `resolve`.
#[derive(Debug, Clone, Default)]
pub struct TurnResolver {
    config: EngineConfig,
}

impl TurnResolver {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Resolve one turn.
    ///
    /// The caller must invoke this serially per session; the inputs are
    /// immutable snapshots and the outputs replace them wholesale.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        response: &TurnResponse,
        world: &GameWorld,
        character: &Character,
        turn_number: u32,
        player_removed_conditions: &[String],
        biology: &dyn BiologyTick,
        rng: &mut R,
    ) -> TurnOutcome {
        let mut log = TurnLog::new(world.time.display());
        let mut next_world = world.clone();
        let mut next_char = character.clone();
        next_world.turn = turn_number;

        if let Some(mode) = response.scene_mode {
            next_world.scene_mode = mode;
        }
        if let Some(tension) = response.tension {
            next_world.tension = tension.min(100);
        }

        // 1. Time
        let elapsed = self.advance_time(response, &mut next_world, &mut log);

        // 2. Biology (external collaborator)
        let biology_outcome = biology.tick(BiologyTickInput {
            elapsed_minutes: elapsed,
            tension: next_world.tension,
            inputs: &response.biology,
            player_cleared_conditions: player_removed_conditions,
            bio: &next_char.bio,
        });
        if let Some(bio) = biology_outcome.bio.clone() {
            // Modifier bounds belong to the validator and decay stages
            let modifiers = next_char.bio.modifiers;
            next_char.bio = bio;
            next_char.bio.modifiers = modifiers;
        }
        for line in &biology_outcome.logs {
            log.info(line.clone());
        }

        // Response deltas pass through the validator; player-cleared
        // conditions count toward the prune gate's removal tally.
        let mut updates = response.character_updates.clone();
        for label in player_removed_conditions {
            if !updates.remove_conditions.contains(label) {
                updates.remove_conditions.push(label.clone());
            }
        }
        let (validated, notices) = apply_character_updates(&next_char, &updates);
        next_char = validated;
        log.extend_notices(notices);

        // 3. Pregnancy
        self.advance_pregnancies(&mut next_world, turn_number, &mut log);

        // 4. Registry append + trim
        if let Some(update) = &response.hidden_update {
            if !update.trim().is_empty() {
                next_world.hidden_registry.append(&mark_occurrences(update));
                log.info("Hidden registry updated");
            }
        }

        // 5. Conception
        self.roll_conception(response, &mut next_world, &next_char, turn_number, rng, &mut log);

        // Bargain obligation clock
        if response.bargain_offered {
            next_world.last_bargain_turn = Some(turn_number);
            log.info("Bargain offered; obligation clock reset");
        }

        // 6. Threat/environment context swap
        if let Some(context) = &response.combat_context {
            next_world.active_threats = context.threats.clone();
            next_world.environment = context.environment.clone();
            // A forming threat of the same name has now surfaced
            next_world
                .emerging_threats
                .retain(|threat| !context.threats.contains(&threat.name));
            log.info(format!("Combat context set: {} threat(s)", context.threats.len()));
        } else if next_world.scene_mode.is_peaceful() && !next_world.active_threats.is_empty() {
            let cleared = next_world.active_threats.len();
            next_world.active_threats.clear();
            log.info(format!("{cleared} threat(s) cleared (non-combat scene)"));
        }

        // 7. Entity upsert
        self.upsert_entities(response, &mut next_world, rng, &mut log);

        // 8. Lore staging
        let now = next_world.time.total_minutes;
        let mut pending_lore = Vec::new();
        for candidate in &response.new_lore {
            pending_lore.push(PendingLore {
                id: LoreId::from_uuid(random_uuid(rng)),
                keyword: candidate.keyword.clone(),
                content: candidate.content.clone(),
                timestamp: now,
            });
            log.info(format!("Lore staged for approval: {}", candidate.keyword));
        }

        // 9. Memory merge
        self.merge_memories(response, &mut next_world, rng, &mut log);

        // 10. Banned-content scan
        let free_text = [
            ("narrative", Some(response.narrative.as_str())),
            ("thought process", response.thought_process.as_deref()),
            ("hidden update", response.hidden_update.as_deref()),
        ];
        for (field, text) in free_text {
            let Some(text) = text else { continue };
            for name in scan_banned_names(text) {
                log.warning(format!("Banned name \"{name}\" used in {field}"));
            }
        }

        // 11. World tick ingestion
        self.ingest_world_tick(response, &mut next_world, turn_number, &mut log);

        // 12. Condition finalize
        self.finalize_conditions(&biology_outcome, &mut next_char, now, &mut log);

        // 13. Bio-modifier decay
        next_char
            .bio
            .modifiers
            .decay_all(next_char.bio.accelerated_decay);

        // 14. Trauma finalize
        next_char.apply_trauma_delta(biology_outcome.trauma_delta);

        if let Some(thoughts) = &response.thought_process {
            log.unshift(thoughts.clone());
        }

        TurnOutcome {
            world: next_world,
            character: next_char,
            debug_log: log.into_entries(),
            pending_lore,
        }
    }

    /// Clamp the requested minutes to the context cap and advance the clock.
    fn advance_time(
        &self,
        response: &TurnResponse,
        world: &mut GameWorld,
        log: &mut TurnLog,
    ) -> u32 {
        let caps = &self.config.time_caps;
        let cap = if response.slept {
            caps.sleep
        } else if world.scene_mode == world_model::SceneMode::Combat {
            caps.combat
        } else {
            caps.default
        };

        let requested = response.time_passed_minutes.unwrap_or(0);
        let clamped = requested.clamp(0, cap);
        if requested > cap {
            log.warning(format!(
                "Requested {requested} minutes exceeds the {cap} minute cap; clamped"
            ));
        }

        world.time.advance(clamped as u64);
        log.set_clock(world.time.display());
        log.info(format!("{clamped} minutes pass ({})", world.time.display()));
        clamped as u32
    }

    fn advance_pregnancies(&self, world: &mut GameWorld, turn: u32, log: &mut TurnLog) {
        for pregnancy in &mut world.pregnancies {
            let transition = pregnancy.advance(turn);
            if transition.week_advanced {
                log.info(format!(
                    "Pregnancy {}: week {}",
                    pregnancy.id, pregnancy.current_week
                ));
            }
            if transition.became_visible {
                log.warning(format!(
                    "Pregnancy {} is now visible (week {})",
                    pregnancy.id, pregnancy.current_week
                ));
            }
            if transition.reached_birth {
                log.warning(format!("Pregnancy {} has reached term", pregnancy.id));
            }
        }
    }

    fn roll_conception<R: Rng + ?Sized>(
        &self,
        response: &TurnResponse,
        world: &mut GameWorld,
        character: &Character,
        turn: u32,
        rng: &mut R,
        log: &mut TurnLog,
    ) {
        // No roll without the explicit event flag
        let Some(event) = &response.conception else { return };

        if rng.gen_bool(self.config.conception_chance) {
            let id = PregnancyId::from_uuid(random_uuid(rng));
            let mother = event
                .mother
                .clone()
                .unwrap_or_else(|| character.name.clone());
            world.pregnancies.push(Pregnancy::conceive(
                id,
                mother,
                event.father.clone(),
                turn,
                world.time.total_minutes,
            ));
            log.success(format!("Conception: pregnancy {id} recorded"));
        } else {
            log.info("Biological event did not result in conception");
        }
    }

    fn upsert_entities<R: Rng + ?Sized>(
        &self,
        response: &TurnResponse,
        world: &mut GameWorld,
        rng: &mut R,
        log: &mut TurnLog,
    ) {
        for update in &response.entity_updates {
            let id = update.id.unwrap_or_else(EntityId::nil);
            match world.find_entity(id, &update.name) {
                Some(index) => {
                    let entity = &mut world.known_entities[index];
                    entity.name = update.name.clone();
                    if let Some(role) = &update.role {
                        entity.role = role.clone();
                    }
                    if let Some(location) = &update.location {
                        entity.location = location.clone();
                    }
                    if let Some(level) = update.relationship_level {
                        entity.relationship_level = level;
                    }
                    if let Some(impression) = &update.impression {
                        entity.impression = impression.clone();
                    }
                    if let Some(leverage) = &update.leverage {
                        entity.leverage = leverage.clone();
                    }
                    entity.ledger.extend(update.ledger_append.iter().cloned());
                    log.info(format!("Entity updated: {}", update.name));
                }
                None => {
                    let entity = KnownEntity {
                        id: update
                            .id
                            .unwrap_or_else(|| EntityId::from_uuid(random_uuid(rng))),
                        name: update.name.clone(),
                        role: update.role.clone().unwrap_or_default(),
                        location: update.location.clone().unwrap_or_default(),
                        relationship_level: update.relationship_level.unwrap_or_default(),
                        impression: update.impression.clone().unwrap_or_default(),
                        leverage: update.leverage.clone().unwrap_or_default(),
                        ledger: update.ledger_append.clone(),
                    };
                    log.success(format!("Entity registered: {}", entity.name));
                    world.known_entities.push(entity);
                }
            }
        }
    }

    fn merge_memories<R: Rng + ?Sized>(
        &self,
        response: &TurnResponse,
        world: &mut GameWorld,
        rng: &mut R,
        log: &mut TurnLog,
    ) {
        let now = world.time.total_minutes;
        for fact in &response.new_memories {
            let best = world
                .memory
                .iter()
                .enumerate()
                .map(|(index, memory)| (index, overlap_similarity(fact, &memory.fact)))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            match best {
                Some((index, similarity))
                    if similarity >= self.config.memory_merge_threshold =>
                {
                    let existing = &mut world.memory[index];
                    if fact.len() > existing.fact.len() {
                        // Fuller account of the same fact: overwrite in
                        // place, keeping the original id
                        existing.fact = fact.clone();
                        existing.timestamp = now;
                        log.success(format!("Memory {} updated with fuller account", existing.id));
                    } else {
                        log.info(format!(
                            "Duplicate memory suppressed (similarity {similarity:.2})"
                        ));
                    }
                }
                _ => {
                    let id = MemoryId::from_uuid(random_uuid(rng));
                    world.memory.push(MemoryFact {
                        id,
                        fact: fact.clone(),
                        timestamp: now,
                    });
                    log.success(format!("Memory recorded: {id}"));
                }
            }
        }
    }

    fn ingest_world_tick(
        &self,
        response: &TurnResponse,
        world: &mut GameWorld,
        turn: u32,
        log: &mut TurnLog,
    ) {
        let Some(tick) = &response.world_tick else { return };

        if tick.is_active() {
            world.mark_world_tick(turn);
        }

        for action in &tick.npc_actions {
            if action.player_visible {
                log.info(format!("NPC: {} - {}", action.actor, action.action));
            } else {
                world
                    .hidden_registry
                    .append(&format!("[{}] {}", action.actor, action.action));
            }
        }

        for change in &tick.environment_changes {
            log.info(format!("Environment: {change}"));
        }

        for threat in &tick.emerging_threats {
            if !world
                .emerging_threats
                .iter()
                .any(|existing| existing.name == threat.name)
            {
                world.emerging_threats.push(EmergingThreatRecord {
                    name: threat.name.clone(),
                    eta: threat.eta.clone(),
                    origin: threat.origin.clone(),
                });
            }
            world.hidden_registry.append(&format!(
                "EMERGING THREAT: {} (ETA {})",
                threat.name, threat.eta
            ));
            log.warning(format!("Emerging threat: {} (ETA {})", threat.name, threat.eta));
        }
    }

    fn finalize_conditions(
        &self,
        biology_outcome: &crate::biology::BiologyOutcome,
        character: &mut Character,
        now: u64,
        log: &mut TurnLog,
    ) {
        for label in &biology_outcome.removed_conditions {
            if character.remove_condition(label) {
                log.info(format!("Condition resolved: {label}"));
            }
        }
        for label in &biology_outcome.added_conditions {
            // The hard cap holds no matter who proposes the condition
            if character.conditions.len() >= CONDITION_HARD_CAP {
                log.warning(format!(
                    "Condition hard cap reached ({}/{CONDITION_HARD_CAP}): \"{label}\" not applied",
                    character.conditions.len()
                ));
                continue;
            }
            if character.add_condition(label.clone()) {
                log.success(format!("Condition applied: {label}"));
            }
        }

        // Stamp anything still missing an application time
        for label in character.conditions.clone() {
            character.condition_timestamps.entry(label).or_insert(now);
        }

        // Expire conditions carrying an elapsed "(N mins)" duration marker
        let expired: Vec<String> = character
            .conditions
            .iter()
            .filter(|label| {
                parse_duration_minutes(label).is_some_and(|duration| {
                    let applied = character
                        .condition_timestamps
                        .get(*label)
                        .copied()
                        .unwrap_or(now);
                    now.saturating_sub(applied) >= duration
                })
            })
            .cloned()
            .collect();
        for label in expired {
            character.remove_condition(&label);
            log.info(format!("Condition expired: {label}"));
        }

        // Timestamps never outlive their condition
        let active: std::collections::HashSet<String> =
            character.conditions.iter().cloned().collect();
        character
            .condition_timestamps
            .retain(|label, _| active.contains(label));
    }
}

/// Draw a v4 UUID from the injected RNG so ids are reproducible in tests.
fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen::<[u8; 16]>()).into_uuid()
}

/// Parse an embedded "(N mins)" duration marker from a condition label.
fn parse_duration_minutes(label: &str) -> Option<u64> {
    for (index, c) in label.char_indices() {
        if c != '(' {
            continue;
        }
        let rest = &label[index + 1..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            continue;
        }
        let after = rest[digits.len()..].trim_start();
        if after.starts_with("mins)") || after.starts_with("min)") {
            return digits.parse().ok();
        }
    }
    None
}
