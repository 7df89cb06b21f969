//! Preview — renders sample expedition logs for content iteration.
//!
//! Usage: preview [--seed <n>] [--duration <minutes>] [--zone <name>]
//!                [--zone-type <type>] [--count <n>] [--content <dir>]
//!
//! With --count above 1, prints variety statistics across the generated
//! logs instead of only the logs themselves.

use expedition_log::core::content::ContentPack;
use expedition_log::core::pipeline::{ExpeditionWorld, LogGenerator};
use expedition_log::core::rarity::is_highlight;
use expedition_log::schema::expedition::{EquipmentDrop, Expedition, Rewards};
use expedition_log::schema::hero::{Hero, HeroId};
use expedition_log::schema::log::ExpeditionLog;
use expedition_log::schema::zone::Zone;
use rustc_hash::FxHashSet;
use std::collections::HashMap;
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_usage();
        return;
    }

    let mut seed: u64 = 42;
    let mut duration: i64 = 45;
    let mut zone_name = "Verdant Woods".to_string();
    let mut zone_type = "forest".to_string();
    let mut count: usize = 1;
    let mut content_dir: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--duration" if i + 1 < args.len() => {
                i += 1;
                duration = args[i].parse().unwrap_or(45);
            }
            "--zone" if i + 1 < args.len() => {
                i += 1;
                zone_name = args[i].clone();
            }
            "--zone-type" if i + 1 < args.len() => {
                i += 1;
                zone_type = args[i].clone();
            }
            "--count" if i + 1 < args.len() => {
                i += 1;
                count = args[i].parse().unwrap_or(1).max(1);
            }
            "--content" if i + 1 < args.len() => {
                i += 1;
                content_dir = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let content = match &content_dir {
        Some(dir) => ContentPack::load_from_dir(Path::new(dir)),
        None => ContentPack::builtin(),
    };
    let content = match content {
        Ok(pack) => pack,
        Err(e) => {
            eprintln!("ERROR: failed to load content pack: {}", e);
            std::process::exit(1);
        }
    };

    let issues = content.validate();
    if !issues.is_empty() {
        eprintln!("WARNING: content pack has {} validation issues", issues.len());
    }

    let mut generator = match LogGenerator::builder()
        .seed(seed)
        .with_content(content)
        .build()
    {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("ERROR: failed to build generator: {}", e);
            std::process::exit(1);
        }
    };

    let zone = Zone {
        name: zone_name,
        zone_type,
        threats: vec!["wolves".to_string()],
    };
    let party = sample_party();
    let defeated = FxHashSet::default();
    let world = ExpeditionWorld {
        zone: &zone,
        subzone: None,
        heroes: &party,
        defeated_bosses: &defeated,
    };
    let expedition = sample_expedition(duration);

    println!("Seed: {}, duration: {} minutes\n", seed, duration);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("ERROR: failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let mut logs = Vec::with_capacity(count);
    for _ in 0..count {
        logs.push(runtime.block_on(generator.generate(&expedition, &world)));
    }

    if count == 1 {
        print_log(&logs[0]);
    } else {
        print_log(&logs[0]);
        print_variety_stats(&logs);
    }
}

fn print_usage() {
    println!("Preview — renders sample expedition logs for content iteration.");
    println!();
    println!("Usage: preview [--seed <n>] [--duration <minutes>] [--zone <name>]");
    println!("               [--zone-type <type>] [--count <n>] [--content <dir>]");
}

fn sample_party() -> Vec<Hero> {
    let make = |id: u64, name: &str, tags: &[&str], traits: &[&str]| Hero {
        id: HeroId(id),
        name: name.to_string(),
        archetype_tags: tags.iter().map(|t| t.to_string()).collect(),
        story_trait_ids: traits.iter().map(|t| t.to_string()).collect(),
    };
    vec![
        make(1, "Greg", &["tank"], &["coward"]),
        make(2, "Mira", &["healer"], &["superstitious"]),
        make(3, "Tam", &["scout"], &["greedy", "curious"]),
        make(4, "Odette", &["caster"], &["overconfident"]),
    ]
}

fn sample_expedition(duration_minutes: i64) -> Expedition {
    Expedition {
        duration_minutes,
        efficiency: 0.85,
        rewards: Rewards {
            gold: 180,
            xp: 500,
            equipment: vec![EquipmentDrop {
                name: "Ashwood Bow".to_string(),
                rarity: "epic".to_string(),
            }],
            materials: 5,
            familiarity_gain: 0.2,
            mastery_gain: 0.1,
        },
        events: Vec::new(),
    }
}

fn print_log(log: &ExpeditionLog) {
    for section in &log.sections {
        println!("[{}]", section.section_type.as_str());
        for entry in &section.entries {
            let marker = if is_highlight(entry.rarity) { "*" } else { " " };
            println!("  {} ({}) {}", marker, entry.rarity.as_str(), entry.text);
        }
    }
    println!(
        "\nSummary: {} entries, {} highlights, {} gold, {} xp",
        log.summary.entry_count, log.summary.highlight_count, log.summary.gold, log.summary.xp
    );
}

fn print_variety_stats(logs: &[ExpeditionLog]) {
    println!("\n=== Variety: {} logs ===\n", logs.len());

    let openings: Vec<&str> = logs
        .iter()
        .filter_map(|log| log.entries().next())
        .map(|entry| entry.text.as_str())
        .collect();
    let unique_openings: std::collections::HashSet<&&str> = openings.iter().collect();
    println!("Unique openings: {} / {}", unique_openings.len(), openings.len());

    let total_entries: usize = logs.iter().map(|l| l.summary.entry_count).sum();
    let total_len: usize = logs
        .iter()
        .flat_map(|l| l.entries())
        .map(|e| e.text.len())
        .sum();
    let avg_len = if total_entries == 0 {
        0.0
    } else {
        total_len as f64 / total_entries as f64
    };
    println!("Average entry length: {:.0} chars", avg_len);

    let mut rarity_counts: HashMap<&str, u32> = HashMap::new();
    for log in logs {
        for entry in log.entries() {
            *rarity_counts.entry(entry.rarity.as_str()).or_insert(0) += 1;
        }
    }
    let mut rarity_freq: Vec<(&str, u32)> = rarity_counts.into_iter().collect();
    rarity_freq.sort_by(|a, b| b.1.cmp(&a.1));
    println!("\nRarity distribution:");
    for (rarity, count) in rarity_freq {
        println!("  {}: {}", rarity, count);
    }
}
