//! Template bank — per-entry-type weighted text templates, RON loading,
//! and literal `{token}` substitution.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::variables::TemplateVariables;
use crate::schema::log::{EntryType, LogRarity};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown entry type '{0}' in template bank")]
    UnknownEntryType(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

fn default_weight() -> u32 {
    1
}

/// One textual template with its starting rarity and optional zone
/// restriction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogTemplate {
    pub text: String,
    pub base_rarity: LogRarity,
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// When present, the template is only eligible in zones of these types.
    #[serde(default)]
    pub zone_types: Option<Vec<String>>,
}

impl LogTemplate {
    fn eligible_for(&self, zone_type: Option<&str>) -> bool {
        match (&self.zone_types, zone_type) {
            (None, _) => true,
            (Some(allowed), Some(zone)) => allowed.iter().any(|z| z == zone),
            (Some(_), None) => false,
        }
    }
}

/// Templates grouped by entry type.
#[derive(Debug, Clone, Default)]
pub struct TemplateBank {
    by_type: FxHashMap<EntryType, Vec<LogTemplate>>,
}

impl TemplateBank {
    /// Load a template bank from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TemplateBank, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a template bank from a RON string. Keys are entry-type names
    /// ("departure", "travel", ...).
    pub fn parse_ron(input: &str) -> Result<TemplateBank, TemplateError> {
        let raw: HashMap<String, Vec<LogTemplate>> = ron::from_str(input)?;
        let mut by_type = FxHashMap::default();
        for (key, templates) in raw {
            let entry_type = EntryType::parse(&key)
                .ok_or_else(|| TemplateError::UnknownEntryType(key.clone()))?;
            by_type.insert(entry_type, templates);
        }
        Ok(TemplateBank { by_type })
    }

    /// Merge another bank into this one. Entry types from `other` replace
    /// the same entry types in `self`.
    pub fn merge(&mut self, other: TemplateBank) {
        for (entry_type, templates) in other.by_type {
            self.by_type.insert(entry_type, templates);
        }
    }

    /// All templates declared for an entry type, zone-eligible or not.
    pub fn templates_for(&self, entry_type: EntryType) -> &[LogTemplate] {
        self.by_type
            .get(&entry_type)
            .map_or(&[], Vec::as_slice)
    }

    /// Entry types with at least one template.
    pub fn entry_types(&self) -> impl Iterator<Item = EntryType> + '_ {
        self.by_type.keys().copied()
    }

    /// Pick a template for the entry type, weighted, honoring zone
    /// restrictions. Returns `None` when nothing is eligible.
    pub fn select(
        &self,
        entry_type: EntryType,
        zone_type: Option<&str>,
        rng: &mut StdRng,
    ) -> Option<&LogTemplate> {
        let eligible: Vec<&LogTemplate> = self
            .templates_for(entry_type)
            .iter()
            .filter(|t| t.eligible_for(zone_type))
            .collect();
        if eligible.is_empty() {
            return None;
        }
        let weights: Vec<u32> = eligible.iter().map(|t| t.weight.max(1)).collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        Some(eligible[dist.sample(rng)])
    }
}

/// Replaces every known `{token}` in `template` with its value from `vars`.
///
/// Substitution is literal: values are inserted verbatim and never
/// re-scanned, so a hero or item name containing braces or pattern
/// metacharacters cannot corrupt later replacements. Unknown tokens are
/// left verbatim in the output so authoring typos stay visible.
pub fn fill_template_variables(template: &str, vars: &TemplateVariables) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let token = &after[..close];
                match vars.get(token) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                // Dangling open brace, emit as-is.
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Extracts every `{token}` name appearing in a template. Used by bank
/// validation and the content linter, not at generation time.
pub fn template_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                tokens.push(after[..close].to_string());
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    tokens
}
