use serde::{Deserialize, Serialize};

/// A zone descriptor — the minimal shape consumed from the zone tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    /// Open classification string ("forest", "ruins", "swamp", ...) used by
    /// zone-restricted templates and reaction triggers.
    pub zone_type: String,
    #[serde(default)]
    pub threats: Vec<String>,
}

/// A subzone within a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subzone {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_creation() {
        let zone = Zone {
            name: "Verdant Woods".to_string(),
            zone_type: "forest".to_string(),
            threats: vec!["wolves".to_string()],
        };
        assert_eq!(zone.name, "Verdant Woods");
        assert_eq!(zone.zone_type, "forest");
        assert_eq!(zone.threats.len(), 1);
    }
}
