//! Propagation engine for the ripple reasoner.
//!
//! The entry point is [`simulate`]: a pure, synchronous, single-threaded
//! function from an immutable graph and a request to a response. Rule
//! contributions are folded into the seed set, the frontier relaxation runs
//! to its bounded fixed point, and traces are read back from the support
//! arena. [`compare`] runs two simulations and diffs them.

pub mod compare;
pub mod error;
pub mod propagate;
pub mod state;
pub mod trace;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use ripple_graph::Graph;
use ripple_model::{
    AffectedNode, Direction, Magnitude, NodeId, PerturbationOp, SimulationRequest,
    SimulationResponse,
};
use ripple_rules::{apply_rules, SeedPerturbation};

pub use compare::compare;
pub use error::SimulateError;
pub use propagate::{propagate, PropagationOutcome};
pub use state::ResolvedSeed;
pub use trace::{TraceBuilder, TRACE_LIMIT};

/// Run one simulation against the graph.
///
/// Fails as a whole when a seed cannot be resolved; edges dropped by
/// context, confidence threshold or time window are silent.
#[instrument(skip_all, name = "simulate")]
pub fn simulate(
    graph: &Graph,
    request: &SimulationRequest,
) -> Result<SimulationResponse, SimulateError> {
    // Resolve user perturbations (aliases allowed) and note their directions
    // for rule evaluation.
    let mut user_seeds: Vec<SeedPerturbation> = Vec::with_capacity(request.perturbations.len());
    let mut user_directions: IndexMap<NodeId, Direction> = IndexMap::new();
    for perturbation in &request.perturbations {
        let node_id = graph
            .resolve(&perturbation.node_id)
            .cloned()
            .ok_or_else(|| SimulateError::UnknownNode(perturbation.node_id.clone()))?;
        let direction = seed_direction(graph, &node_id, perturbation.op, perturbation.value)?;
        user_directions.insert(node_id.clone(), direction);
        user_seeds.push(SeedPerturbation {
            node_id,
            op: perturbation.op,
            value: perturbation.value,
        });
    }

    let effective = apply_rules(
        graph.rules(),
        &request.context,
        &user_seeds,
        &user_directions,
    );
    debug!(
        user = user_seeds.len(),
        effective = effective.len(),
        "perturbation set assembled"
    );

    let mut seeds: Vec<ResolvedSeed> = Vec::with_capacity(effective.len());
    for perturbation in &effective {
        let direction =
            seed_direction(graph, &perturbation.node_id, perturbation.op, perturbation.value)?;
        seeds.push(ResolvedSeed {
            node_id: perturbation.node_id.clone(),
            direction,
            blocked: perturbation.op == PerturbationOp::Block,
        });
    }

    let outcome = propagate(graph, &seeds, &request.context, &request.options);
    let built = TraceBuilder::new(graph, &outcome).build(TRACE_LIMIT);

    let affected_nodes: Vec<AffectedNode> = outcome
        .states
        .iter()
        .filter(|(_, state)| state.direction != Direction::Unchanged)
        .map(|(node_id, state)| AffectedNode {
            node_id: node_id.clone(),
            direction: state.direction,
            magnitude: Magnitude::from_confidence(state.confidence),
            confidence: state.confidence,
            timescale: built
                .timescales
                .get(node_id)
                .copied()
                .unwrap_or_default(),
            tick: state.first_tick,
        })
        .collect();

    Ok(SimulationResponse {
        affected_nodes,
        traces: built.traces,
        max_ticks: outcome.max_ticks,
        dim_unaffected: request.options.dim_unaffected,
    })
}

/// Interpret a perturbation op as a seed direction.
///
/// `set` compares the value against the node's normal-range midpoint; both
/// the value and the range must be present.
fn seed_direction(
    graph: &Graph,
    node_id: &NodeId,
    op: PerturbationOp,
    value: Option<f64>,
) -> Result<Direction, SimulateError> {
    match op {
        PerturbationOp::Increase => Ok(Direction::Up),
        PerturbationOp::Decrease | PerturbationOp::Block => Ok(Direction::Down),
        PerturbationOp::Set => {
            let value = value.ok_or_else(|| SimulateError::SetWithoutValue(node_id.clone()))?;
            let node = graph
                .node(node_id)
                .ok_or_else(|| SimulateError::UnknownNode(node_id.to_string()))?;
            let range = node
                .normal_range
                .ok_or_else(|| SimulateError::SetWithoutRange(node_id.clone()))?;
            Ok(if value > range.midpoint() {
                Direction::Up
            } else {
                Direction::Down
            })
        }
    }
}
