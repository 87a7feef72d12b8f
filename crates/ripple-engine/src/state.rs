//! Per-run propagation state.
//!
//! Everything here is rebuilt for each simulation; the graph itself is never
//! touched. Supporting paths are arena-allocated and referenced by integer,
//! which keeps the back-pointer DAG free of ownership cycles.

use ripple_model::{Direction, NodeId};

/// One accepted piece of support for a node's direction.
///
/// A node keeps at most one support per incoming edge; a revisit over the
/// same edge updates the entry in place when it strictly increases the
/// confidence of the same direction, and is discarded otherwise.
#[derive(Debug, Clone)]
pub struct Support {
    /// Node this support belongs to.
    pub node: NodeId,
    /// Direction this support argues for.
    pub direction: Direction,
    /// Node-level propagated confidence at acceptance time.
    pub confidence: f64,
    /// Tick the support arrived at; seeds are tick 0.
    pub tick: u32,
    /// Edge the support arrived over; `None` marks a seed.
    pub via: Option<usize>,
}

/// Arena of supports accumulated over a run.
#[derive(Debug, Clone, Default)]
pub struct PathArena {
    supports: Vec<Support>,
}

impl PathArena {
    pub fn push(&mut self, support: Support) -> usize {
        let idx = self.supports.len();
        self.supports.push(support);
        idx
    }

    pub fn get(&self, idx: usize) -> &Support {
        &self.supports[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Support {
        &mut self.supports[idx]
    }

    pub fn len(&self) -> usize {
        self.supports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supports.is_empty()
    }
}

/// Merged state of one node during and after propagation.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub direction: Direction,
    pub confidence: f64,
    /// Tick at which the node first became affected.
    pub first_tick: u32,
    /// Arena indices of every accepted support.
    pub support_ids: Vec<usize>,
    /// Blocked nodes act as sinks: no outgoing propagation.
    pub blocked: bool,
    /// Whether the node was seeded directly (user or rule).
    pub seeded: bool,
}

impl NodeState {
    pub fn new() -> Self {
        Self {
            direction: Direction::Unchanged,
            confidence: 0.0,
            first_tick: 0,
            support_ids: Vec::new(),
            blocked: false,
            seeded: false,
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new()
    }
}

/// A perturbation after identifier resolution and `set` interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeed {
    pub node_id: NodeId,
    pub direction: Direction,
    pub blocked: bool,
}
