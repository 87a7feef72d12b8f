//! Simulation errors.

use thiserror::Error;

use ripple_model::NodeId;

/// Errors that fail a whole simulation.
///
/// Seeds that cannot be resolved are fatal; edges dropped by context,
/// confidence threshold or time window are silent.
#[derive(Debug, Clone, Error)]
pub enum SimulateError {
    /// A perturbation names a node (or alias) the graph does not know.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// `set` was requested without a numeric value.
    #[error("perturbation on {0} uses `set` without a value")]
    SetWithoutValue(NodeId),

    /// `set` was requested on a node without a normal range to compare
    /// against.
    #[error("node {0} has no normal range; `set` is not applicable")]
    SetWithoutRange(NodeId),
}
