//! Node identifiers.
//!
//! Identifiers are dot-separated lowercase strings whose first segment names
//! the physiological domain:
//! - `cardio.hemodynamics.map`
//! - `renal.raas.renin`
//! - `acidbase.blood.ph`

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identifier of a knowledge-graph node.
///
/// Identifiers are immutable and support efficient comparison and hashing.
/// They are used as keys in the node table and in per-run propagation state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create an identifier from a dotted string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The leading segment, conventionally the domain label.
    pub fn domain_segment(&self) -> Option<&str> {
        self.0.split('.').next().filter(|s| !s.is_empty())
    }

    /// The trailing segment (leaf name).
    pub fn leaf(&self) -> Option<&str> {
        self.0.split('.').next_back().filter(|s| !s.is_empty())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        let id = NodeId::from("cardio.hemodynamics.map");
        let segments: Vec<&str> = id.segments().collect();
        assert_eq!(segments, vec!["cardio", "hemodynamics", "map"]);
    }

    #[test]
    fn test_domain_and_leaf() {
        let id = NodeId::from("renal.raas.renin");
        assert_eq!(id.domain_segment(), Some("renal"));
        assert_eq!(id.leaf(), Some("renin"));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = NodeId::from("acidbase.blood.ph");
        let b = NodeId::from("cardio.hemodynamics.map");
        assert!(a < b);
    }

    #[test]
    fn test_serde_transparent() {
        let id = NodeId::from("pulm.gasexchange.paco2");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"pulm.gasexchange.paco2\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
