//! The canonical, immutable knowledge graph.

use indexmap::IndexMap;

use ripple_model::{Edge, Node, NodeId, Rule, SummaryTemplate};

/// Normalise an alias for case-insensitive, whitespace-collapsed lookup.
pub(crate) fn normalize_alias(alias: &str) -> String {
    alias
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The merged knowledge graph.
///
/// Built once by [`crate::merge::merge_documents`] and never mutated
/// afterwards; per-run propagation state lives entirely outside the graph.
/// Nodes iterate in ascending id order, edges in authored order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
    /// Edge indices by source node, authored order preserved.
    outgoing: IndexMap<NodeId, Vec<usize>>,
    /// `requires` edge indices by target node.
    requires_in: IndexMap<NodeId, Vec<usize>>,
    /// Normalised alias -> canonical id.
    aliases: IndexMap<String, NodeId>,
    rules: Vec<Rule>,
    summaries: Vec<SummaryTemplate>,
}

impl Graph {
    pub(crate) fn new(
        nodes: IndexMap<NodeId, Node>,
        edges: Vec<Edge>,
        aliases: IndexMap<String, NodeId>,
        rules: Vec<Rule>,
        summaries: Vec<SummaryTemplate>,
    ) -> Self {
        let mut outgoing: IndexMap<NodeId, Vec<usize>> = IndexMap::new();
        let mut requires_in: IndexMap<NodeId, Vec<usize>> = IndexMap::new();
        for (idx, edge) in edges.iter().enumerate() {
            outgoing
                .entry(edge.source.clone())
                .or_default()
                .push(idx);
            if edge.rel == ripple_model::Relation::Requires {
                requires_in
                    .entry(edge.target.clone())
                    .or_default()
                    .push(idx);
            }
        }
        Self {
            nodes,
            edges,
            outgoing,
            requires_in,
            aliases,
            rules,
            summaries,
        }
    }

    /// Look up a node by canonical id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes, ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges, authored order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge by arena index.
    pub fn edge(&self, idx: usize) -> &Edge {
        &self.edges[idx]
    }

    /// Indices of edges leaving a node.
    pub fn outgoing(&self, id: &NodeId) -> &[usize] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of `requires` edges entering a node.
    pub fn requires_into(&self, id: &NodeId) -> &[usize] {
        self.requires_in.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve an identifier or alias to the canonical id.
    pub fn resolve(&self, identifier: &str) -> Option<&NodeId> {
        let id = NodeId::from(identifier);
        if let Some((canonical, _)) = self.nodes.get_key_value(&id) {
            return Some(canonical);
        }
        self.aliases.get(&normalize_alias(identifier))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn summaries(&self) -> &[SummaryTemplate] {
        &self.summaries
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
