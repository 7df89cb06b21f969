//! Rarity math — index-based boost arithmetic over the six-tier ladder.

use crate::schema::log::LogRarity;

/// Ascending loot-rarity vocabulary used by the item tables.
const LOOT_SCALE: [&str; 6] = ["common", "uncommon", "rare", "epic", "legendary", "mythic"];

/// Applies an additive tier delta, saturating at `Legendary` and never
/// going below `Common`.
pub fn boost_rarity(rarity: LogRarity, boost: i32) -> LogRarity {
    let max = (LogRarity::ALL.len() - 1) as i32;
    let index = (rarity.index() as i32 + boost).clamp(0, max);
    LogRarity::ALL[index as usize]
}

/// Tier boost contributed by loot quality. Unknown rarities contribute
/// nothing.
pub fn loot_rarity_boost(loot_rarity: &str) -> i32 {
    match loot_rarity {
        "epic" => 1,
        "legendary" => 2,
        "mythic" => 3,
        _ => 0,
    }
}

/// Position of a loot rarity on the loot scale; unknown rarities rank
/// lowest. Used to pick the featured drop for a run.
pub fn loot_rarity_rank(loot_rarity: &str) -> usize {
    LOOT_SCALE
        .iter()
        .position(|r| *r == loot_rarity)
        .unwrap_or(0)
}

/// Everything that can push an entry's rarity above its template's base.
#[derive(Debug, Clone, Copy, Default)]
pub struct RarityContext<'a> {
    pub reaction_boost: i32,
    pub loot_rarity: Option<&'a str>,
    pub is_discovery: bool,
    pub is_story_hook: bool,
    pub is_boss_kill: bool,
}

impl RarityContext<'_> {
    /// Sum of every applicable contribution.
    pub fn total_boost(&self) -> i32 {
        let mut boost = self.reaction_boost;
        if let Some(loot) = self.loot_rarity {
            boost += loot_rarity_boost(loot);
        }
        if self.is_discovery {
            boost += 2;
        }
        if self.is_story_hook {
            boost += 2;
        }
        if self.is_boss_kill {
            boost += 2;
        }
        boost
    }
}

/// Final tier for an entry: base plus every boost, saturating.
pub fn calculate_final_rarity(base: LogRarity, context: &RarityContext<'_>) -> LogRarity {
    boost_rarity(base, context.total_boost())
}

/// True for tiers worth surfacing in summaries (`Noteworthy` and up).
pub fn is_highlight(rarity: LogRarity) -> bool {
    rarity >= LogRarity::Noteworthy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_identity() {
        assert_eq!(boost_rarity(LogRarity::Common, 0), LogRarity::Common);
    }

    #[test]
    fn boost_saturates_at_legendary() {
        assert_eq!(boost_rarity(LogRarity::Epic, 5), LogRarity::Legendary);
        assert_eq!(boost_rarity(LogRarity::Legendary, 1), LogRarity::Legendary);
    }

    #[test]
    fn boost_steps_up_the_ladder() {
        assert_eq!(boost_rarity(LogRarity::Common, 2), LogRarity::Noteworthy);
        assert_eq!(boost_rarity(LogRarity::Standard, 3), LogRarity::Epic);
    }

    #[test]
    fn negative_boost_clamps_at_common() {
        assert_eq!(boost_rarity(LogRarity::Standard, -5), LogRarity::Common);
    }

    #[test]
    fn loot_boost_table() {
        assert_eq!(loot_rarity_boost("common"), 0);
        assert_eq!(loot_rarity_boost("uncommon"), 0);
        assert_eq!(loot_rarity_boost("rare"), 0);
        assert_eq!(loot_rarity_boost("epic"), 1);
        assert_eq!(loot_rarity_boost("legendary"), 2);
        assert_eq!(loot_rarity_boost("mythic"), 3);
        assert_eq!(loot_rarity_boost("artifact"), 0);
    }

    #[test]
    fn combined_boosts_saturate() {
        let context = RarityContext {
            reaction_boost: 1,
            loot_rarity: Some("legendary"),
            is_discovery: true,
            ..Default::default()
        };
        assert_eq!(context.total_boost(), 5);
        assert_eq!(
            calculate_final_rarity(LogRarity::Standard, &context),
            LogRarity::Legendary
        );
    }

    #[test]
    fn empty_context_keeps_base() {
        let context = RarityContext::default();
        assert_eq!(
            calculate_final_rarity(LogRarity::Memorable, &context),
            LogRarity::Memorable
        );
    }

    #[test]
    fn highlight_threshold() {
        assert!(!is_highlight(LogRarity::Common));
        assert!(!is_highlight(LogRarity::Standard));
        assert!(is_highlight(LogRarity::Noteworthy));
        assert!(is_highlight(LogRarity::Legendary));
    }

    #[test]
    fn loot_rank_ordering() {
        assert!(loot_rarity_rank("mythic") > loot_rarity_rank("legendary"));
        assert!(loot_rarity_rank("legendary") > loot_rarity_rank("rare"));
        assert_eq!(loot_rarity_rank("unknown"), 0);
    }
}
