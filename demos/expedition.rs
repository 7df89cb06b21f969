//! Minimal end-to-end example: generate and print one expedition log.

use expedition_log::core::pipeline::{ExpeditionWorld, LogGenerator};
use expedition_log::schema::expedition::{EquipmentDrop, Expedition, ExpeditionEvent, Rewards};
use expedition_log::schema::hero::{Hero, HeroId};
use expedition_log::schema::zone::{Subzone, Zone};
use rustc_hash::FxHashSet;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let zone = Zone {
        name: "Verdant Woods".to_string(),
        zone_type: "forest".to_string(),
        threats: vec!["wolves".to_string(), "bandits".to_string()],
    };
    let subzone = Subzone {
        name: "Mossy Hollow".to_string(),
    };

    let make_hero = |id: u64, name: &str, tags: &[&str], traits: &[&str]| Hero {
        id: HeroId(id),
        name: name.to_string(),
        archetype_tags: tags.iter().map(|t| t.to_string()).collect(),
        story_trait_ids: traits.iter().map(|t| t.to_string()).collect(),
    };
    let party = vec![
        make_hero(1, "Greg", &["tank"], &["coward"]),
        make_hero(2, "Mira", &["healer"], &["superstitious"]),
        make_hero(3, "Tam", &["scout"], &["greedy"]),
    ];

    let expedition = Expedition {
        duration_minutes: 60,
        efficiency: 0.9,
        rewards: Rewards {
            gold: 220,
            xp: 610,
            equipment: vec![EquipmentDrop {
                name: "Duskfang Blade".to_string(),
                rarity: "legendary".to_string(),
            }],
            materials: 6,
            familiarity_gain: 0.25,
            mastery_gain: 0.1,
        },
        events: vec![ExpeditionEvent::BossKill {
            boss_id: "hollow-warden".to_string(),
            boss_name: "the Hollow Warden".to_string(),
        }],
    };

    let defeated = FxHashSet::default();
    let world = ExpeditionWorld {
        zone: &zone,
        subzone: Some(&subzone),
        heroes: &party,
        defeated_bosses: &defeated,
    };

    let mut generator = LogGenerator::builder()
        .seed(42)
        .build()
        .expect("builtin content pack loads");
    let log = generator.generate(&expedition, &world).await;

    for section in &log.sections {
        println!("== {} ==", section.section_type.as_str());
        for entry in &section.entries {
            println!("[{}] {}", entry.rarity.as_str(), entry.text);
        }
    }
    println!(
        "\n{} entries, {} highlights",
        log.summary.entry_count, log.summary.highlight_count
    );
}
