//! AI enhancement seam — trigger classification, request shaping, the
//! replaceable enhancer strategy, and the deterministic fallback bank.
//!
//! This is the only asynchronous boundary in the crate. Everything here
//! recovers locally: an enhancement failure or timeout substitutes fallback
//! text and is never surfaced to the caller.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use crate::core::variables::TemplateVariables;
use crate::schema::hero::Hero;
use crate::schema::log::{LogEntry, StoryHookPhase};
use crate::schema::zone::{Subzone, Zone};

/// Fixed tone label packaged into every enhancement request.
pub const TONE: &str = "grounded heroic fantasy";

/// How many prior entry texts ride along for narrative continuity.
const LOOKBACK: usize = 3;

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("unknown AI trigger '{0}' in fallback bank")]
    UnknownTrigger(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("enhancement unavailable: {0}")]
    Unavailable(String),
}

/// Why a moment deserves enhanced narrative treatment. At most one trigger
/// per entry, first match in the fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiTrigger {
    LegendaryLoot,
    SecretDiscovery,
    StoryHookStart,
    StoryHookPayoff,
    BossFirstKill,
    TraitSynergy,
}

impl AiTrigger {
    pub const ALL: [AiTrigger; 6] = [
        Self::LegendaryLoot,
        Self::SecretDiscovery,
        Self::StoryHookStart,
        Self::StoryHookPayoff,
        Self::BossFirstKill,
        Self::TraitSynergy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegendaryLoot => "legendary_loot",
            Self::SecretDiscovery => "secret_discovery",
            Self::StoryHookStart => "story_hook_start",
            Self::StoryHookPayoff => "story_hook_payoff",
            Self::BossFirstKill => "boss_first_kill",
            Self::TraitSynergy => "trait_synergy",
        }
    }

    pub fn parse(s: &str) -> Option<AiTrigger> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

/// Caller-side state the trigger classifier needs beyond the entry itself.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    pub previously_defeated_bosses: &'a FxHashSet<String>,
}

/// Classifies whether an entry deserves enhancement.
///
/// Fixed priority, first match returns: mythic loot, secret discovery,
/// story hook (setup vs. payoff), first boss kill, trait synergy. A repeat
/// kill of a known boss is not a match and evaluation continues.
pub fn should_trigger_ai(entry: &LogEntry, context: &TriggerContext<'_>) -> Option<AiTrigger> {
    if entry.loot_rarity.as_deref() == Some("mythic") {
        return Some(AiTrigger::LegendaryLoot);
    }
    if entry.is_secret_discovery {
        return Some(AiTrigger::SecretDiscovery);
    }
    if entry.is_story_hook {
        return Some(if entry.story_hook_phase == Some(StoryHookPhase::Complete) {
            AiTrigger::StoryHookPayoff
        } else {
            AiTrigger::StoryHookStart
        });
    }
    if entry.is_boss_kill {
        if let Some(boss_id) = &entry.boss_id {
            if !context.previously_defeated_bosses.contains(boss_id) {
                return Some(AiTrigger::BossFirstKill);
            }
        }
    }
    if entry.reaction_count >= 2 {
        return Some(AiTrigger::TraitSynergy);
    }
    None
}

/// A hero reduced to what an enhancement prompt needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroSummary {
    pub name: String,
    pub traits: Vec<String>,
}

/// Everything an enhancer needs to rewrite one moment. Pure data, no side
/// effects in its construction.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancementRequest {
    pub trigger: AiTrigger,
    pub entry_text: String,
    pub zone_name: String,
    pub zone_type: String,
    pub subzone_name: Option<String>,
    pub heroes: Vec<HeroSummary>,
    /// Trigger-specific detail: the item name for mythic loot, the boss
    /// name for first kills.
    pub detail: Option<String>,
    /// The last three finalized entry texts, oldest first.
    pub previous_entries: Vec<String>,
    pub tone: String,
}

/// Packages an enhancement request for one entry.
pub fn build_ai_request(
    trigger: AiTrigger,
    entry: &LogEntry,
    zone: &Zone,
    subzone: Option<&Subzone>,
    heroes: &[Hero],
    previous_entries: &[String],
    vars: &TemplateVariables,
) -> EnhancementRequest {
    let detail = match trigger {
        AiTrigger::LegendaryLoot => vars.get("itemName").map(str::to_string),
        AiTrigger::BossFirstKill => vars
            .get("bossName")
            .map(str::to_string)
            .or_else(|| entry.boss_id.clone()),
        _ => None,
    };
    let start = previous_entries.len().saturating_sub(LOOKBACK);
    EnhancementRequest {
        trigger,
        entry_text: entry.text.clone(),
        zone_name: zone.name.clone(),
        zone_type: zone.zone_type.clone(),
        subzone_name: subzone.map(|s| s.name.clone()),
        heroes: heroes
            .iter()
            .map(|h| HeroSummary {
                name: h.name.clone(),
                traits: h.story_trait_ids.clone(),
            })
            .collect(),
        detail,
        previous_entries: previous_entries[start..].to_vec(),
        tone: TONE.to_string(),
    }
}

/// Fallback templates keyed by trigger, three per trigger. Picks are raw
/// templates; the pipeline renders them through the variable context.
#[derive(Debug, Clone, Default)]
pub struct FallbackBank {
    by_trigger: FxHashMap<AiTrigger, Vec<String>>,
}

impl FallbackBank {
    pub fn load_from_ron(path: &Path) -> Result<FallbackBank, FallbackError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse from a RON map of trigger name → template list.
    pub fn parse_ron(input: &str) -> Result<FallbackBank, FallbackError> {
        let raw: HashMap<String, Vec<String>> = ron::from_str(input)?;
        let mut by_trigger = FxHashMap::default();
        for (key, templates) in raw {
            let trigger = AiTrigger::parse(&key)
                .ok_or_else(|| FallbackError::UnknownTrigger(key.clone()))?;
            by_trigger.insert(trigger, templates);
        }
        Ok(FallbackBank { by_trigger })
    }

    /// Merge another bank into this one; triggers from `other` replace the
    /// same triggers here.
    pub fn merge(&mut self, other: FallbackBank) {
        for (trigger, templates) in other.by_trigger {
            self.by_trigger.insert(trigger, templates);
        }
    }

    pub fn templates_for(&self, trigger: AiTrigger) -> &[String] {
        self.by_trigger
            .get(&trigger)
            .map_or(&[], Vec::as_slice)
    }

    /// A random fallback template for the trigger, or a neutral line when
    /// the bank has a gap.
    pub fn pick(&self, trigger: AiTrigger, rng: &mut StdRng) -> String {
        self.templates_for(trigger)
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| "It was a moment the party would remember.".to_string())
    }
}

/// The replaceable enhancement strategy. A real model client implements
/// this; the engine only ever sees the trait.
#[async_trait]
pub trait Enhancer: Send + Sync {
    async fn enhance(&self, request: &EnhancementRequest) -> Result<String, EnhanceError>;
}

/// The reference strategy: resolves immediately with a fallback-bank pick,
/// ignoring the timeout and never calling a model.
pub struct FallbackEnhancer {
    bank: FallbackBank,
    rng: Mutex<StdRng>,
}

impl FallbackEnhancer {
    pub fn new(bank: FallbackBank, seed: u64) -> Self {
        Self {
            bank,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl Enhancer for FallbackEnhancer {
    async fn enhance(&self, request: &EnhancementRequest) -> Result<String, EnhanceError> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(self.bank.pick(request.trigger, &mut rng))
    }
}

/// Races a strategy against the timeout; on timeout or error, substitutes
/// the supplied fallback text. Failures never propagate.
pub async fn enhance_with_timeout(
    enhancer: &dyn Enhancer,
    request: &EnhancementRequest,
    timeout: Duration,
    fallback: String,
) -> String {
    match tokio::time::timeout(timeout, enhancer.enhance(request)).await {
        Ok(Ok(text)) => text,
        Ok(Err(error)) => {
            tracing::warn!(
                trigger = request.trigger.as_str(),
                %error,
                "enhancement failed, using fallback"
            );
            fallback
        }
        Err(_) => {
            tracing::warn!(
                trigger = request.trigger.as_str(),
                timeout_ms = timeout.as_millis() as u64,
                "enhancement timed out, using fallback"
            );
            fallback
        }
    }
}
