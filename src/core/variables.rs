//! Variable context builder — resolves every fill-in-the-blank value once
//! per generation run.

use rand::rngs::StdRng;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::schema::hero::Hero;
use crate::schema::zone::{Subzone, Zone};

/// The canonical variable names templates may reference. Anything outside
/// this list in a bank template is a content-authoring error caught by
/// validation and the linter.
pub const KNOWN_VARIABLES: &[&str] = &[
    "zoneName",
    "zoneType",
    "subzoneName",
    "randomHero",
    "anotherHero",
    "leaderHero",
    "tankHero",
    "healerHero",
    "scoutHero",
    "casterHero",
    "enemyName",
    "enemyCount",
    "enemyPack",
    "itemName",
    "itemRarity",
    "goldAmount",
    "timeOfDay",
    "weather",
];

const TIMES_OF_DAY: [&str; 6] = ["dawn", "morning", "midday", "dusk", "twilight", "night"];

const WEATHER: [&str; 6] = [
    "clear skies",
    "a light drizzle",
    "rolling fog",
    "gusty winds",
    "overcast gloom",
    "scattered sunshine",
];

/// A flat name → value mapping, built fresh per generation run and
/// immutable afterwards apart from overrides merged at construction.
#[derive(Debug, Clone, Default)]
pub struct TemplateVariables {
    values: FxHashMap<String, String>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Copies every entry from `overrides` into this map, replacing any
    /// generated default with the same key.
    pub fn merge(&mut self, overrides: &TemplateVariables) {
        for (key, value) in &overrides.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves the full variable context for one generation run.
///
/// Hero references: `randomHero`/`anotherHero` are two random party members
/// at distinct indices (wrap-around `+1 % len`), `leaderHero` is index 0,
/// and the role variables scan for the first hero tagged `tank`/`healer`/
/// `scout`/`caster`, falling back to `randomHero`. Combat and loot fillers
/// default to generic placeholders; the caller supplies real values through
/// `overrides`, which are applied last and win. An empty party degrades to
/// generic literals rather than panicking.
pub fn build_variable_context(
    zone: &Zone,
    subzone: Option<&Subzone>,
    heroes: &[Hero],
    overrides: Option<&TemplateVariables>,
    rng: &mut StdRng,
) -> TemplateVariables {
    let mut vars = TemplateVariables::new();

    vars.set("zoneName", zone.name.clone());
    vars.set("zoneType", zone.zone_type.clone());
    vars.set(
        "subzoneName",
        subzone.map_or_else(|| zone.name.clone(), |s| s.name.clone()),
    );

    let (random_hero, another_hero) = if heroes.is_empty() {
        ("A hero".to_string(), "Another hero".to_string())
    } else {
        let first = rng.gen_range(0..heroes.len());
        let second = (first + 1) % heroes.len();
        (heroes[first].name.clone(), heroes[second].name.clone())
    };
    let leader_hero = heroes
        .first()
        .map_or_else(|| "The leader".to_string(), |h| h.name.clone());

    vars.set("randomHero", random_hero.clone());
    vars.set("anotherHero", another_hero);
    vars.set("leaderHero", leader_hero);

    for (key, tag) in [
        ("tankHero", "tank"),
        ("healerHero", "healer"),
        ("scoutHero", "scout"),
        ("casterHero", "caster"),
    ] {
        let name = heroes
            .iter()
            .find(|h| h.has_tag(tag))
            .map_or_else(|| random_hero.clone(), |h| h.name.clone());
        vars.set(key, name);
    }

    vars.set("enemyName", "enemy");
    vars.set("enemyCount", "3");
    vars.set("enemyPack", "a group of enemies");
    vars.set("itemName", "item");
    vars.set("itemRarity", "common");
    vars.set("goldAmount", "50");

    vars.set("timeOfDay", TIMES_OF_DAY[rng.gen_range(0..TIMES_OF_DAY.len())]);
    vars.set("weather", WEATHER[rng.gen_range(0..WEATHER.len())]);

    if let Some(overrides) = overrides {
        vars.merge(overrides);
    }

    vars
}
