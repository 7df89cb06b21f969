//! Content Linter — validates content-pack integrity and quality.
//!
//! Usage: content_linter [<content_dir>]

use expedition_log::core::content::ContentPack;
use expedition_log::core::enhance::AiTrigger;
use expedition_log::schema::log::EntryType;
use std::path::Path;
use std::process;

const ALL_ENTRY_TYPES: [EntryType; 6] = [
    EntryType::Departure,
    EntryType::Travel,
    EntryType::Event,
    EntryType::Combat,
    EntryType::Loot,
    EntryType::Return,
];

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        println!("Usage: content_linter [<content_dir>]");
        println!();
        println!("Validates templates.ron, reactions.ron, pair_reactions.ron, and");
        println!("fallbacks.ron in the given directory (default: content).");
        process::exit(0);
    }

    let content_dir = args.get(1).map(String::as_str).unwrap_or("content");
    let path = Path::new(content_dir);

    if !path.is_dir() {
        eprintln!("ERROR: '{}' is not a directory", content_dir);
        process::exit(1);
    }

    let pack = match ContentPack::load_from_dir(path) {
        Ok(pack) => pack,
        Err(e) => {
            eprintln!("ERROR: failed to load content pack: {}", e);
            process::exit(1);
        }
    };

    let template_count: usize = ALL_ENTRY_TYPES
        .iter()
        .map(|t| pack.templates.templates_for(*t).len())
        .sum();
    println!(
        "Loaded {} templates, {} trait reactions, {} pair reactions",
        template_count,
        pack.reactions.singles.len(),
        pack.reactions.pairs.len()
    );

    let errors = pack.validate();
    let warnings = collect_warnings(&pack);

    println!("\n=== Content Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn collect_warnings(pack: &ContentPack) -> Vec<String> {
    let mut warnings = Vec::new();

    for entry_type in ALL_ENTRY_TYPES {
        let count = pack.templates.templates_for(entry_type).len();
        if count > 0 && count < 3 {
            warnings.push(format!(
                "entry type '{}' has only {} templates (minimum 3 recommended)",
                entry_type.as_str(),
                count
            ));
        }
    }

    for trigger in AiTrigger::ALL {
        let count = pack.fallbacks.templates_for(trigger).len();
        if count > 0 && count != 3 {
            warnings.push(format!(
                "trigger '{}' has {} fallback templates (expected 3)",
                trigger.as_str(),
                count
            ));
        }
    }

    for reaction in &pack.reactions.singles {
        if reaction.reactions.len() < 3 {
            warnings.push(format!(
                "trait '{}' has only {} reaction lines (minimum 3 recommended)",
                reaction.trait_id,
                reaction.reactions.len()
            ));
        }
    }

    warnings
}
