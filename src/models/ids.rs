//! String-backed identifiers for matches, participants and maps.
//!
//! The match service is inconsistent about identifier types: the same id
//! may arrive as a JSON number in one payload and a string in another.
//! `EntityId` accepts both and always compares by its canonical text.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An opaque identifier, compared by its canonical string form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new EntityId from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is made only of ASCII digits (an in-game numeric id).
    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
            // Integral floats ("16589.0") must compare equal to "16589".
            RawId::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
            RawId::Float(f) => f.to_string(),
        };
        Ok(Self(id))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Type alias for participant (player) IDs
pub type ParticipantId = EntityId;

/// Type alias for match IDs
pub type MatchId = EntityId;

/// Type alias for map IDs
pub type MapId = EntityId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_from_json_number() {
        let id: EntityId = serde_json::from_str("16589").unwrap();
        assert_eq!(id.as_str(), "16589");
    }

    #[test]
    fn test_entity_id_from_json_string() {
        let id: EntityId = serde_json::from_str("\"76561198000000000\"").unwrap();
        assert_eq!(id.as_str(), "76561198000000000");
    }

    #[test]
    fn test_entity_id_integral_float_matches_integer() {
        let float: EntityId = serde_json::from_str("16589.0").unwrap();
        let int: EntityId = serde_json::from_str("16589").unwrap();
        assert_eq!(float, int);
    }

    #[test]
    fn test_entity_id_is_numeric() {
        assert!(EntityId::from("160368").is_numeric());
        assert!(!EntityId::from("snape").is_numeric());
        assert!(!EntityId::from("").is_numeric());
    }

    #[test]
    fn test_entity_id_serializes_as_string() {
        let id = EntityId::from(7720u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7720\"");
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(format!("{}", EntityId::from("abc")), "abc");
        assert_eq!(format!("{:?}", EntityId::from("abc")), "EntityId(abc)");
    }
}
