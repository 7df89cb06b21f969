use serde::{Deserialize, Serialize};

use super::log::StoryHookPhase;

/// A completed expedition record — the sole structured input to the log
/// pipeline, produced by whatever upstream simulation resolved the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expedition {
    pub duration_minutes: i64,
    pub efficiency: f32,
    pub rewards: Rewards,
    #[serde(default)]
    pub events: Vec<ExpeditionEvent>,
}

/// Rewards resolved for the expedition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rewards {
    pub gold: u64,
    pub xp: u64,
    #[serde(default)]
    pub equipment: Vec<EquipmentDrop>,
    #[serde(default)]
    pub materials: u32,
    #[serde(default)]
    pub familiarity_gain: f32,
    #[serde(default)]
    pub mastery_gain: f32,
}

/// An equipment drop. Rarity is on the loot scale (common, uncommon, rare,
/// epic, legendary, mythic), kept as an open string since the item tables
/// own that vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDrop {
    pub name: String,
    pub rarity: String,
}

/// A notable moment resolved upstream, consumed by the assembler to
/// annotate entries with special flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpeditionEvent {
    BossKill { boss_id: String, boss_name: String },
    SecretDiscovery,
    StoryHook { phase: StoryHookPhase },
    EnemyEncounter { enemy_name: String, enemy_count: u32 },
}
