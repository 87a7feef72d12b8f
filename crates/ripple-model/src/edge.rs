//! Edge records: signed causal relations between nodes.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Relation kind carried by an edge.
///
/// Sign lives here, not in the weight: `increases` preserves the source
/// direction, `decreases` flips it. `converts_to` is informational and
/// `requires` gates activation of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Increases,
    Decreases,
    ConvertsTo,
    Requires,
}

impl Relation {
    /// True for the two relation kinds that propagate direction.
    pub fn is_causal(&self) -> bool {
        matches!(self, Relation::Increases | Relation::Decreases)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Relation::Increases => "increases",
            Relation::Decreases => "decreases",
            Relation::ConvertsTo => "converts_to",
            Relation::Requires => "requires",
        };
        write!(f, "{name}")
    }
}

/// Coarse temporal bucket attached to an edge.
///
/// Ordered `immediate < minutes < hours < days`; used only for time-window
/// filtering and for reporting the dominant timescale of an effect.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Delay {
    #[default]
    Immediate,
    Minutes,
    Hours,
    Days,
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delay::Immediate => "immediate",
            Delay::Minutes => "minutes",
            Delay::Hours => "hours",
            Delay::Days => "days",
        };
        write!(f, "{name}")
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A signed, weighted, context-gated causal relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub rel: Relation,
    /// Authored strength in `(0, 1]`; sign is carried by `rel`.
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub delay: Delay,
    /// Context-flag requirements; the edge is live iff every entry matches
    /// the request context (absent flags read as `false`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub context: IndexMap<String, bool>,
    /// Informational label only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Edge {
    /// Identity under which duplicate edges are merged: same endpoints,
    /// relation, and context requirements (order-insensitive).
    pub fn merge_key(&self) -> (NodeId, NodeId, Relation, Vec<(String, bool)>) {
        let mut context: Vec<(String, bool)> = self
            .context
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        context.sort();
        (self.source.clone(), self.target.clone(), self.rel, context)
    }
}
