//! Expedition Log — procedural expedition-log generation for idle
//! adventure games.
//!
//! Given structured inputs (zone, party composition, duration, rewards),
//! synthesizes a readable narrative log: a three-act skeleton of typed
//! entries, filled from weighted template banks, flavored with trait-driven
//! hero reactions, scored for rarity, and optionally rewritten through a
//! pluggable async enhancement seam with a deterministic fallback.

pub mod core;
pub mod schema;
