//! Simulation request envelope.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::edge::Delay;
use crate::rule::PerturbationOp;

/// A user-supplied forced change on one node, seeding propagation.
///
/// `node_id` may be a canonical identifier or an alias; `value` is only
/// meaningful with `op: set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub node_id: String,
    pub op: PerturbationOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Temporal filter for a run: edges slower than the window are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Immediate,
    Minutes,
    Hours,
    Days,
    #[default]
    All,
}

impl TimeWindow {
    /// Whether an edge with the given delay participates in the run.
    pub fn admits(&self, delay: Delay) -> bool {
        let ceiling = match self {
            TimeWindow::Immediate => Delay::Immediate,
            TimeWindow::Minutes => Delay::Minutes,
            TimeWindow::Hours => Delay::Hours,
            TimeWindow::Days => Delay::Days,
            TimeWindow::All => return true,
        };
        delay <= ceiling
    }
}

fn default_max_hops() -> u32 {
    5
}

fn default_min_confidence() -> f64 {
    0.1
}

fn default_dim_unaffected() -> bool {
    true
}

fn default_conflict_epsilon() -> f64 {
    0.05
}

/// Tuning knobs for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Upper bound on path length from any seed; also bounds tick count.
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
    /// Candidates below this propagated confidence are dropped.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default)]
    pub time_window: TimeWindow,
    /// Presentation hint, passed through to the response untouched.
    #[serde(default = "default_dim_unaffected")]
    pub dim_unaffected: bool,
    /// When opposing directions land within this margin the node resolves
    /// to `unknown`.
    #[serde(default = "default_conflict_epsilon")]
    pub conflict_epsilon: f64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            min_confidence: default_min_confidence(),
            time_window: TimeWindow::All,
            dim_unaffected: default_dim_unaffected(),
            conflict_epsilon: default_conflict_epsilon(),
        }
    }
}

/// One simulation request: seeds, patient context, options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(default)]
    pub perturbations: Vec<Perturbation>,
    #[serde(default)]
    pub context: IndexMap<String, bool>,
    #[serde(default)]
    pub options: SimulationOptions,
}
