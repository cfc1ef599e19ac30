//! Retrieval engine - ranks lore and known entities against the current turn.
//!
//! The query is built from the user input plus the last three model-authored
//! turns. Lore and entities form one joint corpus for IDF purposes; phrase
//! (bigram) matches are weighted 2.5x over single-word matches so multi-word
//! hooks dominate. Entities with a high-priority relationship or a name
//! matching an active threat are mandatory: they bypass the score threshold
//! and the per-category limit entirely.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use world_model::{KnownEntity, LoreEntry};

use crate::history::{recent_model_turns, HistoryEntry};
use crate::similarity::{bigrams, idf, unigrams};

/// Weight applied to bigram (phrase) matches.
pub const BIGRAM_WEIGHT: f32 = 2.5;

/// Minimum score for non-mandatory inclusion.
pub const SCORE_THRESHOLD: f32 = 0.5;

/// Fixed bonus for mandatory entities.
pub const MANDATORY_BONUS: f32 = 50.0;

/// Model turns folded into the query alongside the user input.
pub const QUERY_HISTORY_WINDOW: usize = 3;

/// Number of top scores surfaced in the debug info.
const DEBUG_TOP_SCORES: usize = 8;

/// Per-category result limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetrievalLimits {
    pub lore: usize,
    pub entities: usize,
}

impl Default for RetrievalLimits {
    fn default() -> Self {
        Self { lore: 8, entities: 6 }
    }
}

/// Scoring diagnostics returned alongside the results.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetrievalDebug {
    /// All query tokens (unigrams and bigrams).
    pub query_tokens: Vec<String>,
    /// Top candidate scores across the joint corpus, highest first.
    pub top_scores: Vec<(String, f32)>,
}

/// The bounded, ranked retrieval result for one turn.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub lore: Vec<LoreEntry>,
    pub entities: Vec<KnownEntity>,
    pub debug: RetrievalDebug,
}

/// Tokenized query with unigrams and bigrams kept separate for weighting.
struct Query {
    unigrams: HashSet<String>,
    bigrams: HashSet<String>,
}

impl Query {
    fn build(user_input: &str, history: &[HistoryEntry]) -> Self {
        let mut text = user_input.to_string();
        for turn in recent_model_turns(history, QUERY_HISTORY_WINDOW) {
            text.push(' ');
            text.push_str(turn);
        }

        let tokens = unigrams(&text);
        let pairs = bigrams(&tokens);
        Self {
            unigrams: tokens.into_iter().collect(),
            bigrams: pairs.into_iter().collect(),
        }
    }

    fn all_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.unigrams.iter().cloned().collect();
        tokens.sort();
        let mut pair_tokens: Vec<String> = self.bigrams.iter().cloned().collect();
        pair_tokens.sort();
        tokens.extend(pair_tokens);
        tokens
    }
}

/// A candidate document's token sets.
struct Document {
    unigrams: HashSet<String>,
    bigrams: HashSet<String>,
}

impl Document {
    fn from_text(text: &str) -> Self {
        let tokens = unigrams(text);
        let pairs = bigrams(&tokens);
        Self {
            unigrams: tokens.into_iter().collect(),
            bigrams: pairs.into_iter().collect(),
        }
    }
}

/// Rank lore and entities against the current turn.
///
/// Pure: no state is mutated; results are clones of the matching records.
pub fn retrieve_context(
    user_input: &str,
    history: &[HistoryEntry],
    lore: &[LoreEntry],
    entities: &[KnownEntity],
    active_threat_names: &[String],
    limits: RetrievalLimits,
) -> RetrievedContext {
    let query = Query::build(user_input, history);

    let lore_docs: Vec<Document> = lore
        .iter()
        .map(|entry| Document::from_text(&format!("{} {}", entry.keyword, entry.content)))
        .collect();
    let entity_docs: Vec<Document> = entities
        .iter()
        .map(|entity| Document::from_text(&entity.retrieval_text()))
        .collect();

    // Joint corpus IDF: document frequency per token over lore + entities.
    let total_docs = lore_docs.len() + entity_docs.len();
    let mut doc_frequency: HashMap<&str, usize> = HashMap::new();
    for doc in lore_docs.iter().chain(entity_docs.iter()) {
        for token in doc.unigrams.iter().chain(doc.bigrams.iter()) {
            *doc_frequency.entry(token.as_str()).or_default() += 1;
        }
    }
    let weight = |token: &str| {
        let df = doc_frequency.get(token).copied().unwrap_or(0);
        idf(total_docs, df)
    };

    let score_doc = |doc: &Document| -> f32 {
        let mut score = 0.0;
        for token in query.unigrams.intersection(&doc.unigrams) {
            score += weight(token);
        }
        for token in query.bigrams.intersection(&doc.bigrams) {
            score += BIGRAM_WEIGHT * weight(token);
        }
        score
    };

    let lore_scores: Vec<f32> = lore_docs.iter().map(&score_doc).collect();

    let threat_names: Vec<String> = active_threat_names
        .iter()
        .map(|name| name.to_lowercase())
        .collect();
    let mut entity_scores: Vec<f32> = Vec::with_capacity(entities.len());
    let mut mandatory: Vec<bool> = Vec::with_capacity(entities.len());
    for (entity, doc) in entities.iter().zip(entity_docs.iter()) {
        let is_mandatory = entity.relationship_level.is_high_priority()
            || threat_names.contains(&entity.name.to_lowercase());
        let mut score = score_doc(doc);
        if is_mandatory {
            score += MANDATORY_BONUS;
        }
        entity_scores.push(score);
        mandatory.push(is_mandatory);
    }

    let selected_lore = select(
        lore.len(),
        |i| lore_scores[i],
        |_| false,
        limits.lore,
    );
    let selected_entities = select(
        entities.len(),
        |i| entity_scores[i],
        |i| mandatory[i],
        limits.entities,
    );

    let debug = RetrievalDebug {
        query_tokens: query.all_tokens(),
        top_scores: top_scores(lore, entities, &lore_scores, &entity_scores),
    };

    RetrievedContext {
        lore: selected_lore.into_iter().map(|i| lore[i].clone()).collect(),
        entities: selected_entities
            .into_iter()
            .map(|i| entities[i].clone())
            .collect(),
        debug,
    }
}

/// Pick candidate indices: highest score first (stable on ties), mandatory
/// candidates always included, non-mandatory only above the threshold and
/// only while under the limit.
fn select(
    count: usize,
    score: impl Fn(usize) -> f32,
    is_mandatory: impl Fn(usize) -> bool,
    limit: usize,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..count).collect();
    // sort_by is stable: ties keep original ordering
    order.sort_by(|&a, &b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut selected = Vec::new();
    for index in order {
        if is_mandatory(index) {
            selected.push(index);
        } else if selected.len() < limit && score(index) > SCORE_THRESHOLD {
            selected.push(index);
        }
    }
    selected
}

fn top_scores(
    lore: &[LoreEntry],
    entities: &[KnownEntity],
    lore_scores: &[f32],
    entity_scores: &[f32],
) -> Vec<(String, f32)> {
    let mut scores: Vec<(String, f32)> = lore
        .iter()
        .zip(lore_scores)
        .map(|(entry, &s)| (format!("lore:{}", entry.keyword), s))
        .chain(
            entities
                .iter()
                .zip(entity_scores)
                .map(|(entity, &s)| (format!("entity:{}", entity.name), s)),
        )
        .collect();
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(DEBUG_TOP_SCORES);
    scores
}
