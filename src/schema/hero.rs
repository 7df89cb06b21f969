use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Newtype wrapper for hero IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeroId(pub u64);

/// A party member, reduced to the fields the log engine consumes.
///
/// The engine does not interpret archetype tag semantics — it uses tags
/// solely for role lookups in the variable context (`tank`, `healer`,
/// `scout`, `caster`). Story trait ids key into the reaction banks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub archetype_tags: FxHashSet<String>,
    pub story_trait_ids: Vec<String>,
}

impl Hero {
    /// Returns true if this hero carries the given archetype tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.archetype_tags.contains(tag)
    }
}
