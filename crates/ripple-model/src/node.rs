//! Node records as authored in knowledge packs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Physiological domain a node belongs to.
///
/// Domains are organisational labels for grouping and display; they have no
/// effect on propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Cardio,
    Pulm,
    Renal,
    Acidbase,
    Neuro,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Cardio => "cardio",
            Domain::Pulm => "pulm",
            Domain::Renal => "renal",
            Domain::Acidbase => "acidbase",
            Domain::Neuro => "neuro",
        };
        write!(f, "{name}")
    }
}

/// Kind of physiological entity a node models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Hormone,
    Variable,
    Organ,
    Vessel,
    Process,
}

/// Whether a node carries a numeric measurement or a purely qualitative level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    #[default]
    Qualitative,
    Numeric,
}

/// Normal range of a numeric node, informational except for `set` seeding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalRange {
    pub min: f64,
    pub max: f64,
}

impl NormalRange {
    /// Midpoint of the range; `set <v>` seeds compare against this.
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// A physiological entity in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub state_type: StateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_range: Option<NormalRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Node {
    /// True when another declaration of the same id can be merged with this
    /// one (alias sets union; everything else must agree).
    pub fn is_compatible(&self, other: &Node) -> bool {
        self.domain == other.domain
            && self.node_type == other.node_type
            && self.state_type == other.state_type
    }
}
