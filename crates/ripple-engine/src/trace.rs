//! Trace extraction and macro-summarisation.
//!
//! Affected nodes keep integer back-pointers into the support arena; this
//! module walks them back to the seeds, ranks the resulting paths, renders
//! per-edge step strings, and matches summary templates.

use indexmap::IndexMap;

use ripple_graph::Graph;
use ripple_model::{Delay, Direction, NodeId, Relation, SummaryTemplate, TraceStep};

use crate::propagate::PropagationOutcome;

/// Paths retained per affected node.
pub const TRACE_LIMIT: usize = 5;

/// Upper bound on paths enumerated per node before ranking. Dense feedback
/// graphs can hold more simple paths than anyone will read.
const ENUMERATION_CAP: usize = 256;

/// Traces plus the dominant timescale of each affected node's best path.
#[derive(Debug, Default)]
pub struct BuiltTraces {
    pub traces: IndexMap<NodeId, Vec<TraceStep>>,
    pub timescales: IndexMap<NodeId, Delay>,
}

/// One reconstructed seed-to-node path, still carrying edge indices.
#[derive(Debug, Clone)]
struct TracePath {
    nodes: Vec<NodeId>,
    edges: Vec<usize>,
    confidence: f64,
}

pub struct TraceBuilder<'a> {
    graph: &'a Graph,
    outcome: &'a PropagationOutcome,
}

impl<'a> TraceBuilder<'a> {
    pub fn new(graph: &'a Graph, outcome: &'a PropagationOutcome) -> Self {
        Self { graph, outcome }
    }

    /// Build traces for every affected node, `limit` best paths each.
    pub fn build(&self, limit: usize) -> BuiltTraces {
        let mut built = BuiltTraces::default();

        for (node_id, state) in &self.outcome.states {
            if state.direction == Direction::Unchanged {
                continue;
            }
            let mut paths = self.enumerate(node_id);
            rank(&mut paths);
            paths.truncate(limit);

            let timescale = paths
                .first()
                .map(|p| self.dominant_timescale(p))
                .unwrap_or_default();
            built.timescales.insert(node_id.clone(), timescale);

            let steps: Vec<TraceStep> = paths
                .into_iter()
                .map(|path| self.render(path))
                .collect();
            built.traces.insert(node_id.clone(), steps);
        }

        built
    }

    /// Enumerate simple seed-to-node paths by walking support back-pointers.
    ///
    /// Ticks strictly decrease towards the seed, so every walk terminates;
    /// the visited set additionally keeps feedback loops from re-entering a
    /// node within one path.
    fn enumerate(&self, node_id: &NodeId) -> Vec<TracePath> {
        let mut paths = Vec::new();
        let mut rev_edges = Vec::new();
        let mut visited = Vec::new();
        self.walk(node_id, u32::MAX, &mut rev_edges, &mut visited, &mut paths);

        // Revisits can record the same hop twice under different ticks;
        // collapse identical node sequences.
        let mut seen: Vec<Vec<NodeId>> = Vec::new();
        paths.retain(|p| {
            if seen.contains(&p.nodes) {
                false
            } else {
                seen.push(p.nodes.clone());
                true
            }
        });
        paths
    }

    fn walk(
        &self,
        node_id: &NodeId,
        tick_limit: u32,
        rev_edges: &mut Vec<usize>,
        visited: &mut Vec<NodeId>,
        out: &mut Vec<TracePath>,
    ) {
        if out.len() >= ENUMERATION_CAP {
            return;
        }
        let Some(state) = self.outcome.states.get(node_id) else {
            return;
        };
        visited.push(node_id.clone());

        for &support_id in &state.support_ids {
            let support = self.outcome.arena.get(support_id);
            if support.tick >= tick_limit {
                continue;
            }
            match support.via {
                None => out.push(self.materialize(node_id, rev_edges)),
                Some(edge_idx) => {
                    let edge = self.graph.edge(edge_idx);
                    if visited.contains(&edge.source) {
                        continue;
                    }
                    rev_edges.push(edge_idx);
                    self.walk(&edge.source, support.tick, rev_edges, visited, out);
                    rev_edges.pop();
                }
            }
        }

        visited.pop();
    }

    /// Turn a reversed edge chain ending at `seed` into a forward path.
    fn materialize(&self, seed: &NodeId, rev_edges: &[usize]) -> TracePath {
        let mut nodes = vec![seed.clone()];
        let mut edges = Vec::with_capacity(rev_edges.len());
        let mut confidence = 1.0;
        for &edge_idx in rev_edges.iter().rev() {
            let edge = self.graph.edge(edge_idx);
            nodes.push(edge.target.clone());
            edges.push(edge_idx);
            confidence *= edge.weight;
        }
        TracePath {
            nodes,
            edges,
            confidence,
        }
    }

    fn render(&self, path: TracePath) -> TraceStep {
        let steps = path
            .edges
            .iter()
            .map(|&edge_idx| self.step_string(edge_idx))
            .collect();
        let summary = summarize(self.graph.summaries(), &path.nodes);
        TraceStep {
            path: path.nodes,
            steps,
            confidence: path.confidence,
            summary,
        }
    }

    /// `"<src_label> ↑ <tgt_label>"`, `↓` for decreases, description in
    /// parentheses when the edge carries one.
    fn step_string(&self, edge_idx: usize) -> String {
        let edge = self.graph.edge(edge_idx);
        let arrow = match edge.rel {
            Relation::Decreases => "↓",
            _ => "↑",
        };
        let source_label = self
            .graph
            .node(&edge.source)
            .map(|n| n.label.as_str())
            .unwrap_or(edge.source.as_str());
        let target_label = self
            .graph
            .node(&edge.target)
            .map(|n| n.label.as_str())
            .unwrap_or(edge.target.as_str());
        match &edge.description {
            Some(description) => format!("{source_label} {arrow} {target_label} ({description})"),
            None => format!("{source_label} {arrow} {target_label}"),
        }
    }

    fn dominant_timescale(&self, path: &TracePath) -> Delay {
        path.edges
            .iter()
            .map(|&idx| self.graph.edge(idx).delay)
            .max()
            .unwrap_or_default()
    }
}

/// Descending confidence, ties broken by shorter length then lexicographic
/// node sequence.
fn rank(paths: &mut [TracePath]) {
    paths.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.nodes.len().cmp(&b.nodes.len()))
            .then_with(|| a.nodes.cmp(&b.nodes))
    });
}

/// Match summary templates against a path by node-id subsequence.
///
/// Matches are ordered by where they start in the path, labels deduplicated,
/// and joined into a single clinical phrase.
fn summarize(templates: &[SummaryTemplate], path: &[NodeId]) -> Option<String> {
    if path.len() < 2 {
        return None;
    }

    let mut matches: Vec<(usize, &str)> = templates
        .iter()
        .filter_map(|t| subsequence_start(path, &t.sequence).map(|idx| (idx, t.label.as_str())))
        .collect();
    if matches.is_empty() {
        return None;
    }
    matches.sort_by_key(|(idx, _)| *idx);

    let mut labels: Vec<&str> = Vec::new();
    for (_, label) in matches {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    Some(match labels.len() {
        1 => labels[0].to_string(),
        2 => format!("{} followed by {}", labels[0], labels[1]),
        _ => {
            let head = labels[..labels.len() - 1].join(", ");
            format!("{head}, followed by {}", labels[labels.len() - 1])
        }
    })
}

/// Index in `path` where `sequence` starts matching as a subsequence.
fn subsequence_start(path: &[NodeId], sequence: &[NodeId]) -> Option<usize> {
    if sequence.is_empty() {
        return None;
    }
    let mut seq_idx = 0;
    let mut first_match = None;
    for (idx, node_id) in path.iter().enumerate() {
        if node_id == &sequence[seq_idx] {
            if first_match.is_none() {
                first_match = Some(idx);
            }
            seq_idx += 1;
            if seq_idx == sequence.len() {
                return first_match;
            }
        }
    }
    None
}
