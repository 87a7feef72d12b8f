//! Authored rules and macro-summary templates.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Symbolic operation applied to a node by a rule or a user perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerturbationOp {
    Increase,
    Decrease,
    Block,
    Set,
}

impl fmt::Display for PerturbationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PerturbationOp::Increase => "increase",
            PerturbationOp::Decrease => "decrease",
            PerturbationOp::Block => "block",
            PerturbationOp::Set => "set",
        };
        write!(f, "{name}")
    }
}

/// A when/then rule evaluated once before propagation.
///
/// `when` is a boolean expression over context flags and user-seed directions
/// (parsed by `ripple-rules`); a true rule contributes its `then` mapping to
/// the effective perturbation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub when: String,
    pub then: IndexMap<NodeId, PerturbationOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A macro-summary template.
///
/// When `sequence` occurs as a subsequence of a trace path, the trace is
/// summarised with `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTemplate {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub sequence: Vec<NodeId>,
}
