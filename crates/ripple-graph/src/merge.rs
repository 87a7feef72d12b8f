//! Merging parsed pack documents into the canonical graph.

use indexmap::IndexMap;
use tracing::{debug, info};

use ripple_model::{Edge, Node, NodeId, Relation, Rule, SummaryTemplate};
use ripple_rules::parse_when;

use crate::diagnostics::{Diagnostic, LoadError, Severity};
use crate::document::NamedDocument;
use crate::graph::{normalize_alias, Graph};

/// A successful merge: the graph plus any warnings emitted along the way.
#[derive(Debug)]
pub struct MergeOutcome {
    pub graph: Graph,
    pub warnings: Vec<Diagnostic>,
}

/// Merge an ordered list of pack documents into one graph.
///
/// Document order matters in two places: the later of two duplicate edges
/// wins the weight, and the first of two compatible node declarations wins
/// the label and optional fields. Any fatal diagnostic fails the whole merge
/// and no graph is produced.
pub fn merge_documents(documents: &[NamedDocument]) -> Result<MergeOutcome, LoadError> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let nodes = merge_nodes(documents, &mut diagnostics);
    let aliases = build_alias_index(&nodes, documents, &mut diagnostics);
    let edges = merge_edges(documents, &nodes, &mut diagnostics);
    let rules = collect_rules(documents, &nodes, &mut diagnostics);
    let summaries = collect_summaries(documents, &nodes, &mut diagnostics);

    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        return Err(LoadError { diagnostics });
    }

    let mut nodes = nodes;
    nodes.sort_keys();

    let graph = Graph::new(nodes, edges, aliases, rules, summaries);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        rules = graph.rules().len(),
        warnings = diagnostics.len(),
        "knowledge graph merged"
    );

    Ok(MergeOutcome {
        graph,
        warnings: diagnostics,
    })
}

fn merge_nodes(
    documents: &[NamedDocument],
    diagnostics: &mut Vec<Diagnostic>,
) -> IndexMap<NodeId, Node> {
    let mut nodes: IndexMap<NodeId, Node> = IndexMap::new();

    for doc in documents {
        for node in &doc.document.nodes {
            match nodes.get_mut(&node.id) {
                None => {
                    nodes.insert(node.id.clone(), node.clone());
                }
                Some(existing) if existing.is_compatible(node) => {
                    // Compatible re-declaration: union the alias sets, first
                    // declaration keeps label and optional fields.
                    for alias in &node.aliases {
                        if !existing.aliases.contains(alias) {
                            existing.aliases.push(alias.clone());
                        }
                    }
                    debug!(id = %node.id, pack = %doc.origin, "merged duplicate node");
                }
                Some(_) => {
                    diagnostics.push(
                        Diagnostic::error(
                            &doc.origin,
                            node.id.as_str(),
                            "duplicate node id with conflicting domain/type/state_type",
                        )
                        .with_field("id"),
                    );
                }
            }
        }
    }

    nodes
}

fn build_alias_index(
    nodes: &IndexMap<NodeId, Node>,
    documents: &[NamedDocument],
    diagnostics: &mut Vec<Diagnostic>,
) -> IndexMap<String, NodeId> {
    // Pack origin per node id, for pointing duplicate-alias diagnostics at a
    // document rather than at the merged graph.
    let mut origin_of: IndexMap<&NodeId, &str> = IndexMap::new();
    for doc in documents {
        for node in &doc.document.nodes {
            origin_of.entry(&node.id).or_insert(doc.origin.as_str());
        }
    }

    let mut aliases: IndexMap<String, NodeId> = IndexMap::new();
    for node in nodes.values() {
        for alias in &node.aliases {
            let key = normalize_alias(alias);
            match aliases.get(&key) {
                None => {
                    aliases.insert(key, node.id.clone());
                }
                Some(owner) if owner == &node.id => {}
                Some(owner) => {
                    let pack = origin_of
                        .get(&node.id)
                        .copied()
                        .unwrap_or("<unknown>");
                    diagnostics.push(
                        Diagnostic::error(
                            pack,
                            node.id.as_str(),
                            format!("alias '{alias}' already resolves to {owner}"),
                        )
                        .with_field("aliases"),
                    );
                }
            }
        }
    }

    aliases
}

fn merge_edges(
    documents: &[NamedDocument],
    nodes: &IndexMap<NodeId, Node>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Edge> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut index_of: IndexMap<(NodeId, NodeId, Relation, Vec<(String, bool)>), usize> =
        IndexMap::new();

    for doc in documents {
        for edge in &doc.document.edges {
            let record = format!("edge {} -> {}", edge.source, edge.target);

            let mut valid = true;
            for endpoint in [&edge.source, &edge.target] {
                if !nodes.contains_key(endpoint) {
                    diagnostics.push(
                        Diagnostic::error(
                            &doc.origin,
                            record.clone(),
                            format!("endpoint '{endpoint}' does not exist"),
                        ),
                    );
                    valid = false;
                }
            }
            if !(edge.weight > 0.0 && edge.weight <= 1.0) {
                diagnostics.push(
                    Diagnostic::error(
                        &doc.origin,
                        record.clone(),
                        format!("weight {} outside (0, 1]", edge.weight),
                    )
                    .with_field("weight"),
                );
                valid = false;
            }
            if edge.source == edge.target && edge.rel.is_causal() {
                diagnostics.push(Diagnostic::error(
                    &doc.origin,
                    record.clone(),
                    "self-loop on a causal relation",
                ));
                valid = false;
            }
            if !valid {
                continue;
            }

            match index_of.get(&edge.merge_key()) {
                None => {
                    index_of.insert(edge.merge_key(), edges.len());
                    edges.push(edge.clone());
                }
                Some(&existing_idx) => {
                    // Duplicate edge: later weight wins, descriptions
                    // concatenate.
                    let existing = &mut edges[existing_idx];
                    existing.weight = edge.weight;
                    existing.delay = edge.delay;
                    existing.description =
                        match (existing.description.take(), edge.description.clone()) {
                            (Some(a), Some(b)) if a != b => Some(format!("{a}; {b}")),
                            (Some(a), _) => Some(a),
                            (None, b) => b,
                        };
                    debug!(pack = %doc.origin, record, "merged duplicate edge");
                }
            }
        }
    }

    edges
}

fn collect_rules(
    documents: &[NamedDocument],
    nodes: &IndexMap<NodeId, Node>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Rule> {
    let mut rules: Vec<Rule> = Vec::new();

    for doc in documents {
        'rules: for rule in &doc.document.rules {
            if let Err(err) = parse_when(&rule.when) {
                diagnostics.push(
                    Diagnostic::warning(&doc.origin, &rule.id, format!("rule dropped: {err}"))
                        .with_field("when"),
                );
                continue;
            }
            for (node_id, op) in &rule.then {
                if !nodes.contains_key(node_id) {
                    diagnostics.push(
                        Diagnostic::warning(
                            &doc.origin,
                            &rule.id,
                            format!("rule dropped: unknown node '{node_id}'"),
                        )
                        .with_field("then"),
                    );
                    continue 'rules;
                }
                // `set` needs a numeric value, which only user perturbations
                // carry.
                if *op == ripple_model::PerturbationOp::Set {
                    diagnostics.push(
                        Diagnostic::warning(
                            &doc.origin,
                            &rule.id,
                            "rule dropped: `set` is not available to rules",
                        )
                        .with_field("then"),
                    );
                    continue 'rules;
                }
            }
            rules.push(rule.clone());
        }
    }

    rules
}

fn collect_summaries(
    documents: &[NamedDocument],
    nodes: &IndexMap<NodeId, Node>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<SummaryTemplate> {
    let mut summaries: Vec<SummaryTemplate> = Vec::new();

    for doc in documents {
        'templates: for template in &doc.document.summaries {
            for node_id in &template.sequence {
                if !nodes.contains_key(node_id) {
                    diagnostics.push(
                        Diagnostic::warning(
                            &doc.origin,
                            &template.id,
                            format!("summary template dropped: unknown node '{node_id}'"),
                        )
                        .with_field("sequence"),
                    );
                    continue 'templates;
                }
            }
            summaries.push(template.clone());
        }
    }

    summaries
}
