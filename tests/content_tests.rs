//! Content-pack loading and integrity integration tests.

use expedition_log::core::content::ContentPack;
use expedition_log::core::enhance::AiTrigger;
use expedition_log::core::template::template_tokens;
use expedition_log::core::variables::KNOWN_VARIABLES;
use expedition_log::schema::log::EntryType;
use std::path::Path;

#[test]
fn builtin_pack_matches_on_disk_pack() {
    let builtin = ContentPack::builtin().unwrap();
    let on_disk = ContentPack::load_from_dir(Path::new("content")).unwrap();
    for entry_type in [
        EntryType::Departure,
        EntryType::Travel,
        EntryType::Event,
        EntryType::Combat,
        EntryType::Loot,
        EntryType::Return,
    ] {
        assert_eq!(
            builtin.templates.templates_for(entry_type).len(),
            on_disk.templates.templates_for(entry_type).len(),
            "template count mismatch for {}",
            entry_type.as_str()
        );
    }
    assert_eq!(
        builtin.reactions.singles.len(),
        on_disk.reactions.singles.len()
    );
    assert_eq!(builtin.reactions.pairs.len(), on_disk.reactions.pairs.len());
}

#[test]
fn every_entry_type_has_templates() {
    let pack = ContentPack::builtin().unwrap();
    for entry_type in [
        EntryType::Departure,
        EntryType::Travel,
        EntryType::Event,
        EntryType::Combat,
        EntryType::Loot,
        EntryType::Return,
    ] {
        assert!(
            pack.templates.templates_for(entry_type).len() >= 3,
            "entry type '{}' has fewer than 3 templates",
            entry_type.as_str()
        );
    }
}

#[test]
fn builtin_pack_validates_clean() {
    let pack = ContentPack::builtin().unwrap();
    let issues = pack.validate();
    assert!(issues.is_empty(), "builtin pack has issues: {:#?}", issues);
}

#[test]
fn every_template_token_is_a_known_variable() {
    let pack = ContentPack::builtin().unwrap();
    for entry_type in [
        EntryType::Departure,
        EntryType::Travel,
        EntryType::Event,
        EntryType::Combat,
        EntryType::Loot,
        EntryType::Return,
    ] {
        for template in pack.templates.templates_for(entry_type) {
            for token in template_tokens(&template.text) {
                assert!(
                    KNOWN_VARIABLES.contains(&token.as_str()),
                    "template '{}' uses unknown variable '{}'",
                    template.text,
                    token
                );
            }
        }
    }
}

#[test]
fn pair_templates_reference_both_heroes() {
    let pack = ContentPack::builtin().unwrap();
    assert!(!pack.reactions.pairs.is_empty());
    for pair in &pack.reactions.pairs {
        for text in &pair.reactions {
            let tokens = template_tokens(text);
            assert!(
                tokens.iter().any(|t| t == "hero1") && tokens.iter().any(|t| t == "hero2"),
                "pair template missing a hero reference: {}",
                text
            );
        }
    }
}

#[test]
fn fallbacks_cover_all_triggers_with_three_templates() {
    let pack = ContentPack::builtin().unwrap();
    for trigger in AiTrigger::ALL {
        assert_eq!(
            pack.fallbacks.templates_for(trigger).len(),
            3,
            "trigger '{}' should carry exactly three fallback templates",
            trigger.as_str()
        );
    }
}

#[test]
fn reaction_chances_and_boosts_are_in_range() {
    let pack = ContentPack::builtin().unwrap();
    for reaction in &pack.reactions.singles {
        assert!(
            reaction.trigger_chance > 0.0 && reaction.trigger_chance <= 1.0,
            "trait '{}' chance out of range",
            reaction.trait_id
        );
        assert!((1..=2).contains(&reaction.rarity_boost));
    }
    for pair in &pack.reactions.pairs {
        assert!(pair.trigger_chance > 0.0 && pair.trigger_chance <= 1.0);
        assert!((1..=2).contains(&pair.rarity_boost));
    }
}
