//! Reaction selector — trait-flavored commentary attached to log entries,
//! with pair reactions preempting individual ones.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::template::fill_template_variables;
use crate::core::variables::TemplateVariables;
use crate::schema::hero::Hero;
use crate::schema::log::{EntryType, HeroReaction};

#[derive(Debug, Error)]
pub enum ReactionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// When a reaction is allowed to fire: which entry types, and optionally
/// which zone types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionTriggers {
    pub entry_types: Vec<EntryType>,
    #[serde(default)]
    pub zone_types: Option<Vec<String>>,
}

impl ReactionTriggers {
    pub fn matches(&self, entry_type: EntryType, zone_type: Option<&str>) -> bool {
        if !self.entry_types.contains(&entry_type) {
            return false;
        }
        match (&self.zone_types, zone_type) {
            (None, _) => true,
            (Some(allowed), Some(zone)) => allowed.iter().any(|z| z == zone),
            (Some(_), None) => false,
        }
    }
}

/// A single-trait reaction bank entry. Templates reference `{hero}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitReaction {
    pub trait_id: String,
    pub triggers: ReactionTriggers,
    pub reactions: Vec<String>,
    pub trigger_chance: f64,
    pub rarity_boost: i32,
}

/// A two-trait reaction bank entry. Templates reference both `{hero1}` and
/// `{hero2}`; a successful match emits one combined reaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitPairReaction {
    pub trait_ids: (String, String),
    pub triggers: ReactionTriggers,
    pub reactions: Vec<String>,
    pub trigger_chance: f64,
    pub rarity_boost: i32,
}

/// Single- and pair-trait reaction entries, loaded once and read-only
/// thereafter.
#[derive(Debug, Clone, Default)]
pub struct ReactionBank {
    pub singles: Vec<TraitReaction>,
    pub pairs: Vec<TraitPairReaction>,
}

impl ReactionBank {
    /// Load single-trait entries from a RON file (a list of entries).
    pub fn load_singles_from_ron(path: &Path) -> Result<Vec<TraitReaction>, ReactionError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    /// Load pair entries from a RON file (a list of entries).
    pub fn load_pairs_from_ron(path: &Path) -> Result<Vec<TraitPairReaction>, ReactionError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    pub fn parse_singles_ron(input: &str) -> Result<Vec<TraitReaction>, ReactionError> {
        Ok(ron::from_str(input)?)
    }

    pub fn parse_pairs_ron(input: &str) -> Result<Vec<TraitPairReaction>, ReactionError> {
        Ok(ron::from_str(input)?)
    }

    /// Append another bank's entries after this one's. Earlier entries keep
    /// lookup priority.
    pub fn merge(&mut self, other: ReactionBank) {
        self.singles.extend(other.singles);
        self.pairs.extend(other.pairs);
    }
}

/// Selects 0–2 reactions for one entry.
///
/// Strict order: a matching trait-pair gets one roll and, on success,
/// preempts individual reactions entirely with a single combined record.
/// Otherwise individual traits are scanned in party order; a trait that
/// fires is marked so it cannot fire again across heroes, and after the
/// first success scanning continues with probability 0.2. Never more than
/// two reactions. Traits absent from the bank are skipped silently.
pub fn select_reactions(
    heroes: &[Hero],
    entry_type: EntryType,
    zone_type: Option<&str>,
    bank: &ReactionBank,
    rng: &mut StdRng,
) -> Vec<HeroReaction> {
    // Trait id -> owning hero; first hero wins a shared trait.
    let mut owners: FxHashMap<&str, &Hero> = FxHashMap::default();
    for hero in heroes {
        for trait_id in &hero.story_trait_ids {
            owners.entry(trait_id.as_str()).or_insert(hero);
        }
    }

    // Pair check: the first matching pair gets the one roll.
    let matching_pair = bank.pairs.iter().find(|pair| {
        owners.contains_key(pair.trait_ids.0.as_str())
            && owners.contains_key(pair.trait_ids.1.as_str())
            && pair.triggers.matches(entry_type, zone_type)
    });
    if let Some(pair) = matching_pair {
        if rng.gen_bool(pair.trigger_chance.clamp(0.0, 1.0)) {
            let hero1 = owners[pair.trait_ids.0.as_str()];
            let hero2 = owners[pair.trait_ids.1.as_str()];
            if let Some(template) = pair.reactions.choose(rng) {
                let mut names = TemplateVariables::new();
                names.set("hero1", hero1.name.clone());
                names.set("hero2", hero2.name.clone());
                return vec![HeroReaction {
                    hero_id: hero1.id,
                    hero_name: hero1.name.clone(),
                    trait_id: pair.trait_ids.0.clone(),
                    text: fill_template_variables(template, &names),
                    rarity_boost: pair.rarity_boost,
                }];
            }
        }
    }

    // Individual check, party order.
    let mut reactions = Vec::new();
    let mut triggered: FxHashSet<&str> = FxHashSet::default();
    'heroes: for hero in heroes {
        for trait_id in &hero.story_trait_ids {
            if triggered.contains(trait_id.as_str()) {
                continue;
            }
            let Some(entry) = bank.singles.iter().find(|r| {
                r.trait_id == *trait_id && r.triggers.matches(entry_type, zone_type)
            }) else {
                continue;
            };
            if !rng.gen_bool(entry.trigger_chance.clamp(0.0, 1.0)) {
                continue;
            }
            let Some(template) = entry.reactions.choose(rng) else {
                continue;
            };
            let mut name = TemplateVariables::new();
            name.set("hero", hero.name.clone());
            reactions.push(HeroReaction {
                hero_id: hero.id,
                hero_name: hero.name.clone(),
                trait_id: trait_id.clone(),
                text: fill_template_variables(template, &name),
                rarity_boost: entry.rarity_boost,
            });
            triggered.insert(trait_id.as_str());
            if reactions.len() >= 2 {
                break 'heroes;
            }
            // Usually one reaction is enough; keep scanning one time in five.
            if !rng.gen_bool(0.2) {
                break 'heroes;
            }
        }
    }
    reactions
}
