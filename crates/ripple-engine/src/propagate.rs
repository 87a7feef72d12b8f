//! Context-gated signed propagation.
//!
//! A deterministic breadth-ordered relaxation over the causal edges: ticks
//! ascend, and within a tick nodes are processed in ascending id order.
//! Every path is bounded by `max_hops`, so feedback cycles terminate; a node
//! is revisited only when a new support strictly improves its state.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::{debug, trace};

use ripple_graph::{edge_is_live, Graph};
use ripple_model::{Direction, NodeId, Relation, SimulationOptions};

use crate::state::{NodeState, PathArena, ResolvedSeed, Support};

/// Minimum confidence improvement that counts as progress when deciding
/// whether to re-propagate from a node.
const CONFIDENCE_NUDGE: f64 = 1e-9;

/// Everything a run produces before trace extraction.
#[derive(Debug)]
pub struct PropagationOutcome {
    /// Per-node merged state, keyed and ordered by node id.
    pub states: BTreeMap<NodeId, NodeState>,
    /// Arena of all accepted supports.
    pub arena: PathArena,
    /// Highest `first_tick` observed.
    pub max_ticks: u32,
}

/// Run the frontier relaxation from the given seeds.
pub fn propagate(
    graph: &Graph,
    seeds: &[ResolvedSeed],
    context: &IndexMap<String, bool>,
    options: &SimulationOptions,
) -> PropagationOutcome {
    let mut arena = PathArena::default();
    let mut states: BTreeMap<NodeId, NodeState> = BTreeMap::new();

    // Tick 0: seeds.
    let mut frontier: BTreeSet<NodeId> = BTreeSet::new();
    for seed in seeds {
        let support_id = arena.push(Support {
            node: seed.node_id.clone(),
            direction: seed.direction,
            confidence: 1.0,
            tick: 0,
            via: None,
        });
        let state = states.entry(seed.node_id.clone()).or_default();
        state.support_ids.push(support_id);
        state.blocked |= seed.blocked;
        state.seeded = true;
        frontier.insert(seed.node_id.clone());
    }
    for node_id in &frontier {
        if let Some(state) = states.get_mut(node_id) {
            remerge(state, &arena, options.conflict_epsilon);
        }
    }
    debug!(seeds = frontier.len(), "propagation seeded");

    for tick in 0..options.max_hops {
        if frontier.is_empty() {
            break;
        }

        // Generate candidates from the current frontier, then apply them all
        // before the next layer so the pass stays order-independent within a
        // tick.
        let mut staged: BTreeMap<NodeId, Vec<Support>> = BTreeMap::new();
        for node_id in &frontier {
            let state = &states[node_id];
            if state.blocked {
                trace!(node = %node_id, "blocked node is a sink");
                continue;
            }
            if !matches!(state.direction, Direction::Up | Direction::Down) {
                continue;
            }

            for &edge_idx in graph.outgoing(node_id) {
                let edge = graph.edge(edge_idx);
                if !edge.rel.is_causal() {
                    continue;
                }
                if !edge_is_live(edge, context) {
                    continue;
                }
                if !options.time_window.admits(edge.delay) {
                    continue;
                }

                let direction = match edge.rel {
                    Relation::Increases => state.direction,
                    Relation::Decreases => state.direction.flipped(),
                    _ => continue,
                };
                let confidence = state.confidence * edge.weight;
                if confidence < options.min_confidence {
                    continue;
                }
                if edge.rel == Relation::Increases
                    && !requires_satisfied(graph, &edge.target, &states, context)
                {
                    trace!(target = %edge.target, "activation gated by requires");
                    continue;
                }

                staged.entry(edge.target.clone()).or_default().push(Support {
                    node: edge.target.clone(),
                    direction,
                    confidence,
                    tick: tick + 1,
                    via: Some(edge_idx),
                });
            }
        }

        let mut next_frontier: BTreeSet<NodeId> = BTreeSet::new();
        for (target, candidates) in staged {
            let state = states.entry(target.clone()).or_default();
            let had_supports = !state.support_ids.is_empty();
            let previous = (state.direction, state.confidence);

            for candidate in candidates {
                // One support per incoming edge: a revisit is accepted only
                // when it strictly increases the confidence of the direction
                // already on record for that edge.
                let existing = state
                    .support_ids
                    .iter()
                    .copied()
                    .find(|&sid| arena.get(sid).via == candidate.via);
                match existing {
                    None => {
                        let support_id = arena.push(candidate);
                        state.support_ids.push(support_id);
                    }
                    Some(support_id) => {
                        let support = arena.get_mut(support_id);
                        if candidate.direction == support.direction
                            && candidate.confidence > support.confidence
                        {
                            support.confidence = candidate.confidence;
                            support.tick = support.tick.min(candidate.tick);
                        }
                    }
                }
            }
            remerge(state, &arena, options.conflict_epsilon);

            let improved = !had_supports
                || state.direction != previous.0
                || state.confidence > previous.1 + CONFIDENCE_NUDGE;
            if improved {
                next_frontier.insert(target);
            }
        }

        trace!(tick, activated = next_frontier.len(), "tick complete");
        frontier = next_frontier;
    }

    let max_ticks = states.values().map(|s| s.first_tick).max().unwrap_or(0);

    PropagationOutcome {
        states,
        arena,
        max_ticks,
    }
}

/// All live `requires` predecessors of `target` must currently be up.
fn requires_satisfied(
    graph: &Graph,
    target: &NodeId,
    states: &BTreeMap<NodeId, NodeState>,
    context: &IndexMap<String, bool>,
) -> bool {
    graph.requires_into(target).iter().all(|&edge_idx| {
        let edge = graph.edge(edge_idx);
        if !edge_is_live(edge, context) {
            return true;
        }
        states
            .get(&edge.source)
            .is_some_and(|s| s.direction == Direction::Up)
    })
}

/// Re-run the merge discipline over a node's accumulated supports.
///
/// Per-direction confidence is a probabilistic OR across supporting paths;
/// opposing directions within `epsilon` of each other resolve to `unknown`
/// (the only source of `unknown` in a run).
fn remerge(state: &mut NodeState, arena: &PathArena, epsilon: f64) {
    let mut up_complement = 1.0f64;
    let mut down_complement = 1.0f64;
    let mut up_first: Option<u32> = None;
    let mut down_first: Option<u32> = None;

    for &support_id in &state.support_ids {
        let support = arena.get(support_id);
        match support.direction {
            Direction::Up => {
                up_complement *= 1.0 - support.confidence;
                up_first = Some(up_first.map_or(support.tick, |t| t.min(support.tick)));
            }
            Direction::Down => {
                down_complement *= 1.0 - support.confidence;
                down_first = Some(down_first.map_or(support.tick, |t| t.min(support.tick)));
            }
            _ => {}
        }
    }

    let up_confidence = 1.0 - up_complement;
    let down_confidence = 1.0 - down_complement;

    match (up_first, down_first) {
        (Some(up_tick), Some(down_tick)) => {
            if (up_confidence - down_confidence).abs() < epsilon {
                state.direction = Direction::Unknown;
                state.confidence = up_confidence.max(down_confidence);
                state.first_tick = up_tick.min(down_tick);
            } else if up_confidence > down_confidence {
                state.direction = Direction::Up;
                state.confidence = up_confidence;
                state.first_tick = up_tick;
            } else {
                state.direction = Direction::Down;
                state.confidence = down_confidence;
                state.first_tick = down_tick;
            }
        }
        (Some(up_tick), None) => {
            state.direction = Direction::Up;
            state.confidence = up_confidence;
            state.first_tick = up_tick;
        }
        (None, Some(down_tick)) => {
            state.direction = Direction::Down;
            state.confidence = down_confidence;
            state.first_tick = down_tick;
        }
        (None, None) => {
            state.direction = Direction::Unchanged;
            state.confidence = 0.0;
            state.first_tick = 0;
        }
    }
}
