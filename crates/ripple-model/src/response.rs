//! Simulation and comparison response envelopes.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::edge::Delay;
use crate::ids::NodeId;

/// Resolved direction of change of a node after propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Unknown,
    Unchanged,
}

impl Direction {
    /// Mirror of this direction; `unknown` and `unchanged` are fixed points.
    pub fn flipped(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            other => *other,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Unknown => "unknown",
            Direction::Unchanged => "unchanged",
        };
        write!(f, "{name}")
    }
}

/// Coarse effect size, bucketed from final confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Magnitude {
    None,
    Small,
    Medium,
    Large,
}

impl Magnitude {
    /// Bucket boundaries: `[0,0.2) none`, `[0.2,0.5) small`,
    /// `[0.5,0.8) medium`, `[0.8,1] large`.
    pub fn from_confidence(confidence: f64) -> Magnitude {
        if confidence < 0.2 {
            Magnitude::None
        } else if confidence < 0.5 {
            Magnitude::Small
        } else if confidence < 0.8 {
            Magnitude::Medium
        } else {
            Magnitude::Large
        }
    }
}

/// One node whose direction changed during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedNode {
    pub node_id: NodeId,
    pub direction: Direction,
    pub magnitude: Magnitude,
    pub confidence: f64,
    /// Coarsest delay along the best trace path to this node.
    pub timescale: Delay,
    /// Tick at which the node first became affected; seeds are tick 0.
    pub tick: u32,
}

/// One causal path from a seed to an affected node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub path: Vec<NodeId>,
    /// One human-readable step string per traversed edge.
    pub steps: Vec<String>,
    /// Product of edge weights along the path.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Result of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub affected_nodes: Vec<AffectedNode>,
    pub traces: IndexMap<NodeId, Vec<TraceStep>>,
    /// Highest `tick` value observed.
    pub max_ticks: u32,
    /// Echo of the request's presentation hint.
    pub dim_unaffected: bool,
}

/// Classification of a node across a baseline/intervention pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    New,
    Resolved,
    DirectionFlip,
    Strengthened,
    Weakened,
    Unchanged,
}

/// Per-node delta between the baseline and intervention runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedNode {
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_direction: Option<Direction>,
    pub baseline_confidence: f64,
    pub intervention_confidence: f64,
    /// Signed `intervention - baseline` confidence delta.
    pub confidence_delta: f64,
    pub change_type: ChangeType,
}

/// Baseline and intervention legs run with identical options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub baseline: crate::request::SimulationRequest,
    pub intervention: crate::request::SimulationRequest,
}

/// Both raw runs plus the per-node classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub baseline: SimulationResponse,
    pub intervention: SimulationResponse,
    pub changed_nodes: Vec<ComparedNode>,
}
