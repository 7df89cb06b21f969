//! Content packs — the immutable data banks the generator reads, loaded
//! once and injectable so alternate packs can be swapped per deployment.

use std::path::Path;
use thiserror::Error;

use crate::core::enhance::{AiTrigger, FallbackBank, FallbackError};
use crate::core::reaction::{ReactionBank, ReactionError};
use crate::core::template::{template_tokens, TemplateBank, TemplateError};
use crate::core::variables::KNOWN_VARIABLES;
use crate::schema::log::EntryType;

const BUILTIN_TEMPLATES: &str = include_str!("../../content/templates.ron");
const BUILTIN_REACTIONS: &str = include_str!("../../content/reactions.ron");
const BUILTIN_PAIR_REACTIONS: &str = include_str!("../../content/pair_reactions.ron");
const BUILTIN_FALLBACKS: &str = include_str!("../../content/fallbacks.ron");

const ALL_ENTRY_TYPES: [EntryType; 6] = [
    EntryType::Departure,
    EntryType::Travel,
    EntryType::Event,
    EntryType::Combat,
    EntryType::Loot,
    EntryType::Return,
];

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("template bank error: {0}")]
    Template(#[from] TemplateError),
    #[error("reaction bank error: {0}")]
    Reaction(#[from] ReactionError),
    #[error("fallback bank error: {0}")]
    Fallback(#[from] FallbackError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every data bank the generator consumes, bundled.
#[derive(Debug, Clone, Default)]
pub struct ContentPack {
    pub templates: TemplateBank,
    pub reactions: ReactionBank,
    pub fallbacks: FallbackBank,
}

impl ContentPack {
    /// The content pack embedded in the library.
    pub fn builtin() -> Result<ContentPack, ContentError> {
        Ok(ContentPack {
            templates: TemplateBank::parse_ron(BUILTIN_TEMPLATES)?,
            reactions: ReactionBank {
                singles: ReactionBank::parse_singles_ron(BUILTIN_REACTIONS)?,
                pairs: ReactionBank::parse_pairs_ron(BUILTIN_PAIR_REACTIONS)?,
            },
            fallbacks: FallbackBank::parse_ron(BUILTIN_FALLBACKS)?,
        })
    }

    /// Loads a pack from a directory holding `templates.ron`,
    /// `reactions.ron`, `pair_reactions.ron`, and `fallbacks.ron`.
    pub fn load_from_dir(dir: &Path) -> Result<ContentPack, ContentError> {
        Ok(ContentPack {
            templates: TemplateBank::load_from_ron(&dir.join("templates.ron"))?,
            reactions: ReactionBank {
                singles: ReactionBank::load_singles_from_ron(&dir.join("reactions.ron"))?,
                pairs: ReactionBank::load_pairs_from_ron(&dir.join("pair_reactions.ron"))?,
            },
            fallbacks: FallbackBank::load_from_ron(&dir.join("fallbacks.ron"))?,
        })
    }

    /// Layers another pack on top of this one.
    pub fn merge(&mut self, other: ContentPack) {
        self.templates.merge(other.templates);
        self.reactions.merge(other.reactions);
        self.fallbacks.merge(other.fallbacks);
    }

    /// Data-integrity check run at load time by tests and the linter, not
    /// during generation. Returns human-readable issues; empty means clean.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for entry_type in ALL_ENTRY_TYPES {
            let templates = self.templates.templates_for(entry_type);
            if templates.is_empty() {
                issues.push(format!(
                    "no templates declared for entry type '{}'",
                    entry_type.as_str()
                ));
            }
            for template in templates {
                for token in template_tokens(&template.text) {
                    if !KNOWN_VARIABLES.contains(&token.as_str()) {
                        issues.push(format!(
                            "template for '{}' references unknown variable '{{{}}}': {}",
                            entry_type.as_str(),
                            token,
                            template.text
                        ));
                    }
                }
            }
        }

        for reaction in &self.reactions.singles {
            for text in &reaction.reactions {
                for token in template_tokens(text) {
                    if token != "hero" && !KNOWN_VARIABLES.contains(&token.as_str()) {
                        issues.push(format!(
                            "reaction for trait '{}' references unknown variable '{{{}}}'",
                            reaction.trait_id, token
                        ));
                    }
                }
            }
            if !(0.0..=1.0).contains(&reaction.trigger_chance) || reaction.trigger_chance == 0.0 {
                issues.push(format!(
                    "reaction for trait '{}' has trigger chance {} outside (0, 1]",
                    reaction.trait_id, reaction.trigger_chance
                ));
            }
            if !(1..=2).contains(&reaction.rarity_boost) {
                issues.push(format!(
                    "reaction for trait '{}' has rarity boost {} outside 1..=2",
                    reaction.trait_id, reaction.rarity_boost
                ));
            }
        }

        for pair in &self.reactions.pairs {
            let label = format!("{}+{}", pair.trait_ids.0, pair.trait_ids.1);
            for text in &pair.reactions {
                let tokens = template_tokens(text);
                if !tokens.iter().any(|t| t == "hero1") || !tokens.iter().any(|t| t == "hero2") {
                    issues.push(format!(
                        "pair reaction '{}' template missing {{hero1}} or {{hero2}}: {}",
                        label, text
                    ));
                }
                for token in tokens {
                    if token != "hero1"
                        && token != "hero2"
                        && !KNOWN_VARIABLES.contains(&token.as_str())
                    {
                        issues.push(format!(
                            "pair reaction '{}' references unknown variable '{{{}}}'",
                            label, token
                        ));
                    }
                }
            }
            if !(0.0..=1.0).contains(&pair.trigger_chance) || pair.trigger_chance == 0.0 {
                issues.push(format!(
                    "pair reaction '{}' has trigger chance {} outside (0, 1]",
                    label, pair.trigger_chance
                ));
            }
            if !(1..=2).contains(&pair.rarity_boost) {
                issues.push(format!(
                    "pair reaction '{}' has rarity boost {} outside 1..=2",
                    label, pair.rarity_boost
                ));
            }
        }

        for trigger in AiTrigger::ALL {
            let templates = self.fallbacks.templates_for(trigger);
            if templates.is_empty() {
                issues.push(format!(
                    "no fallback templates for trigger '{}'",
                    trigger.as_str()
                ));
            }
            for text in templates {
                for token in template_tokens(text) {
                    if !KNOWN_VARIABLES.contains(&token.as_str()) {
                        issues.push(format!(
                            "fallback for trigger '{}' references unknown variable '{{{}}}'",
                            trigger.as_str(),
                            token
                        ));
                    }
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reaction::{ReactionTriggers, TraitPairReaction, TraitReaction};

    #[test]
    fn builtin_pack_parses() {
        let pack = ContentPack::builtin().unwrap();
        assert!(!pack.templates.templates_for(EntryType::Departure).is_empty());
        assert!(!pack.reactions.singles.is_empty());
        assert!(!pack.reactions.pairs.is_empty());
        assert_eq!(
            pack.fallbacks.templates_for(AiTrigger::LegendaryLoot).len(),
            3
        );
    }

    #[test]
    fn builtin_pack_validates_clean() {
        let pack = ContentPack::builtin().unwrap();
        let issues = pack.validate();
        assert!(issues.is_empty(), "builtin pack has issues: {:?}", issues);
    }

    #[test]
    fn validate_flags_unknown_template_variable() {
        let mut pack = ContentPack::builtin().unwrap();
        pack.templates.merge(
            TemplateBank::parse_ron(
                r#"{ "travel": [ (text: "The {wizardHat} glowed.", base_rarity: common) ] }"#,
            )
            .unwrap(),
        );
        let issues = pack.validate();
        assert!(issues.iter().any(|i| i.contains("wizardHat")));
    }

    #[test]
    fn validate_flags_pair_template_missing_hero2() {
        let mut pack = ContentPack::builtin().unwrap();
        pack.reactions.pairs.push(TraitPairReaction {
            trait_ids: ("a".to_string(), "b".to_string()),
            triggers: ReactionTriggers {
                entry_types: vec![EntryType::Combat],
                zone_types: None,
            },
            reactions: vec!["{hero1} acted alone.".to_string()],
            trigger_chance: 0.5,
            rarity_boost: 2,
        });
        let issues = pack.validate();
        assert!(issues.iter().any(|i| i.contains("missing {hero1} or {hero2}")));
    }

    #[test]
    fn validate_flags_bad_trigger_chance_and_boost() {
        let mut pack = ContentPack::builtin().unwrap();
        pack.reactions.singles.push(TraitReaction {
            trait_id: "broken".to_string(),
            triggers: ReactionTriggers {
                entry_types: vec![EntryType::Combat],
                zone_types: None,
            },
            reactions: vec!["{hero} flickered.".to_string()],
            trigger_chance: 1.5,
            rarity_boost: 4,
        });
        let issues = pack.validate();
        assert!(issues.iter().any(|i| i.contains("trigger chance")));
        assert!(issues.iter().any(|i| i.contains("rarity boost")));
    }

    #[test]
    fn validate_flags_missing_fallback_trigger() {
        let pack = ContentPack {
            templates: ContentPack::builtin().unwrap().templates,
            reactions: ReactionBank::default(),
            fallbacks: FallbackBank::default(),
        };
        let issues = pack.validate();
        for trigger in AiTrigger::ALL {
            assert!(issues.iter().any(|i| i.contains(trigger.as_str())));
        }
    }

    #[test]
    fn merge_layers_packs() {
        let mut base = ContentPack::builtin().unwrap();
        let overlay = ContentPack {
            templates: TemplateBank::parse_ron(
                r#"{ "loot": [ (text: "Overlay loot in {zoneName}.", base_rarity: standard) ] }"#,
            )
            .unwrap(),
            reactions: ReactionBank::default(),
            fallbacks: FallbackBank::default(),
        };
        base.merge(overlay);
        assert_eq!(base.templates.templates_for(EntryType::Loot).len(), 1);
        assert!(!base.reactions.singles.is_empty());
    }
}
