//! Skeleton builder — decides how many entries a log gets and shapes the
//! three-act arc before any text is rendered.

use rand::rngs::StdRng;
use rand::Rng;

use crate::schema::log::EntryType;

/// A structural slot in the log plan, produced before any text exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonSlot {
    pub entry_type: EntryType,
    pub is_climax: bool,
}

/// Number of entries for an expedition of the given duration.
///
/// Buckets (inclusive upper bounds, minutes): ≤15→3–4, ≤30→4–5, ≤45→5–6,
/// ≤60→6–7, ≤90→7–8, longer→8–10. Uniform within the bucket. Negative
/// durations clamp to the shortest bucket.
pub fn calculate_entry_count(duration_minutes: i64, rng: &mut StdRng) -> usize {
    let duration = duration_minutes.max(0);
    let (lo, hi): (usize, usize) = match duration {
        d if d <= 15 => (3, 4),
        d if d <= 30 => (4, 5),
        d if d <= 45 => (5, 6),
        d if d <= 60 => (6, 7),
        d if d <= 90 => (7, 8),
        _ => (8, 10),
    };
    rng.gen_range(lo..=hi)
}

/// Builds the slot plan for a log of `entry_count` entries.
///
/// Always opens with `Departure` and closes with `Return`. Middle slots are
/// typed by relative progress through the arc: travel-weighted early, an
/// event/combat mix rising to the climax, loot-weighted falling action, and
/// travel for the wind-down. Guarantees at least one `Combat` middle slot
/// and exactly one slot flagged `is_climax`.
pub fn build_skeleton(entry_count: usize, rng: &mut StdRng) -> Vec<SkeletonSlot> {
    let entry_count = entry_count.max(3);
    let middle_count = entry_count - 2;

    let mut slots = Vec::with_capacity(entry_count);
    slots.push(SkeletonSlot {
        entry_type: EntryType::Departure,
        is_climax: false,
    });

    for i in 0..middle_count {
        let progress = i as f64 / middle_count as f64;
        let entry_type = if progress < 0.3 {
            if rng.gen_bool(0.7) {
                EntryType::Travel
            } else {
                EntryType::Event
            }
        } else if progress < 0.6 {
            if rng.gen_bool(0.5) {
                EntryType::Event
            } else {
                EntryType::Combat
            }
        } else if progress < 0.8 {
            if rng.gen_bool(0.6) {
                EntryType::Loot
            } else {
                EntryType::Event
            }
        } else {
            EntryType::Travel
        };
        slots.push(SkeletonSlot {
            entry_type,
            is_climax: false,
        });
    }

    // Every log needs a fight. Force one into the middle if the fill
    // produced none.
    let has_combat = slots[1..]
        .iter()
        .any(|s| s.entry_type == EntryType::Combat);
    if !has_combat {
        let forced = (middle_count as f64 * 0.5).floor() as usize;
        slots[1 + forced].entry_type = EntryType::Combat;
    }

    let climax = (middle_count as f64 * 0.6).floor() as usize;
    slots[1 + climax].is_climax = true;

    slots.push(SkeletonSlot {
        entry_type: EntryType::Return,
        is_climax: false,
    });

    tracing::debug!(
        entries = slots.len(),
        climax_index = 1 + climax,
        "built log skeleton"
    );

    slots
}
