use serde::{Deserialize, Serialize};

use super::hero::HeroId;

/// The narrative role of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Departure,
    Travel,
    Event,
    Combat,
    Loot,
    Return,
}

impl EntryType {
    /// Returns the bank key for this entry type (e.g., "combat").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::Travel => "travel",
            Self::Event => "event",
            Self::Combat => "combat",
            Self::Loot => "loot",
            Self::Return => "return",
        }
    }

    /// Parses a bank key back into an entry type.
    pub fn parse(s: &str) -> Option<EntryType> {
        match s {
            "departure" => Some(Self::Departure),
            "travel" => Some(Self::Travel),
            "event" => Some(Self::Event),
            "combat" => Some(Self::Combat),
            "loot" => Some(Self::Loot),
            "return" => Some(Self::Return),
            _ => None,
        }
    }
}

/// The six-tier rarity ladder for log entries, ascending.
///
/// Declaration order is the total order — boost math is index-based and
/// saturates at `Legendary`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogRarity {
    Common,
    Standard,
    Noteworthy,
    Memorable,
    Epic,
    Legendary,
}

impl LogRarity {
    /// All tiers, ascending.
    pub const ALL: [LogRarity; 6] = [
        Self::Common,
        Self::Standard,
        Self::Noteworthy,
        Self::Memorable,
        Self::Epic,
        Self::Legendary,
    ];

    /// Position on the ladder, 0 = `Common`.
    pub fn index(self) -> usize {
        match self {
            Self::Common => 0,
            Self::Standard => 1,
            Self::Noteworthy => 2,
            Self::Memorable => 3,
            Self::Epic => 4,
            Self::Legendary => 5,
        }
    }

    /// Tier at the given position, clamped to `Legendary` past the end.
    pub fn from_index(index: usize) -> LogRarity {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Standard => "standard",
            Self::Noteworthy => "noteworthy",
            Self::Memorable => "memorable",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

/// Where a story hook stands when an entry references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryHookPhase {
    Setup,
    Complete,
}

/// One line of generated narrative with its type, rarity, and the flags the
/// rarity calculator and AI trigger read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub entry_type: EntryType,
    pub rarity: LogRarity,
    /// Raw additive tier delta prior to clamping; recorded only when
    /// non-zero.
    #[serde(default)]
    pub rarity_boost: Option<i32>,
    #[serde(default)]
    pub loot_rarity: Option<String>,
    #[serde(default)]
    pub is_story_hook: bool,
    #[serde(default)]
    pub story_hook_phase: Option<StoryHookPhase>,
    #[serde(default)]
    pub is_boss_kill: bool,
    #[serde(default)]
    pub boss_id: Option<String>,
    #[serde(default)]
    pub is_secret_discovery: bool,
    #[serde(default)]
    pub reaction_count: usize,
}

impl LogEntry {
    /// A plain entry with no flags, at the given rarity.
    pub fn new(text: impl Into<String>, entry_type: EntryType, rarity: LogRarity) -> Self {
        Self {
            text: text.into(),
            entry_type,
            rarity,
            rarity_boost: None,
            loot_rarity: None,
            is_story_hook: false,
            story_hook_phase: None,
            is_boss_kill: false,
            boss_id: None,
            is_secret_discovery: false,
            reaction_count: 0,
        }
    }
}

/// Trait-flavored commentary attached to an entry. A pair match consumes
/// both heroes' identities in one record, attributed to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroReaction {
    pub hero_id: HeroId,
    pub hero_name: String,
    pub trait_id: String,
    pub text: String,
    pub rarity_boost: i32,
}

/// An ordered group of entries sharing a narrative phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    pub section_type: EntryType,
    pub entries: Vec<LogEntry>,
}

/// Aggregate figures attached to the finished log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub duration_minutes: i64,
    pub efficiency: f32,
    pub gold: u64,
    pub xp: u64,
    pub entry_count: usize,
    pub highlight_count: usize,
}

/// The finished expedition log. First section is always `departure`, last
/// is always `return`; section order mirrors the skeleton order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditionLog {
    pub sections: Vec<LogSection>,
    pub summary: LogSummary,
}

impl ExpeditionLog {
    /// Iterate every entry in section order.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }
}
