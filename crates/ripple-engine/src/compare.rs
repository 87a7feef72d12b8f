//! Baseline-vs-intervention comparison.

use std::collections::BTreeSet;

use tracing::debug;

use ripple_graph::Graph;
use ripple_model::{
    AffectedNode, ChangeType, CompareRequest, CompareResponse, ComparedNode, NodeId,
    SimulationResponse,
};

use crate::error::SimulateError;
use crate::simulate;

/// Confidence delta below which two runs count as unchanged.
const DELTA_EPSILON: f64 = 0.05;

/// Run both legs with their own requests and classify every node affected in
/// either.
pub fn compare(graph: &Graph, request: &CompareRequest) -> Result<CompareResponse, SimulateError> {
    let baseline = simulate(graph, &request.baseline)?;
    let intervention = simulate(graph, &request.intervention)?;
    let changed_nodes = classify(&baseline, &intervention);
    debug!(changed = changed_nodes.len(), "comparison complete");

    Ok(CompareResponse {
        baseline,
        intervention,
        changed_nodes,
    })
}

fn classify(baseline: &SimulationResponse, intervention: &SimulationResponse) -> Vec<ComparedNode> {
    let baseline_by_id = index_by_id(baseline);
    let intervention_by_id = index_by_id(intervention);

    let mut ids: BTreeSet<&NodeId> = BTreeSet::new();
    ids.extend(baseline_by_id.iter().map(|(id, _)| *id));
    ids.extend(intervention_by_id.iter().map(|(id, _)| *id));

    ids.into_iter()
        .map(|id| {
            let before = lookup(&baseline_by_id, id);
            let after = lookup(&intervention_by_id, id);
            classify_node(id, before, after)
        })
        .collect()
}

fn index_by_id(response: &SimulationResponse) -> Vec<(&NodeId, &AffectedNode)> {
    response
        .affected_nodes
        .iter()
        .map(|node| (&node.node_id, node))
        .collect()
}

fn lookup<'a>(index: &[(&NodeId, &'a AffectedNode)], id: &NodeId) -> Option<&'a AffectedNode> {
    index
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .map(|(_, node)| *node)
}

fn classify_node(
    id: &NodeId,
    before: Option<&AffectedNode>,
    after: Option<&AffectedNode>,
) -> ComparedNode {
    let baseline_confidence = before.map(|n| n.confidence).unwrap_or(0.0);
    let intervention_confidence = after.map(|n| n.confidence).unwrap_or(0.0);
    let confidence_delta = intervention_confidence - baseline_confidence;

    let change_type = match (before, after) {
        (None, Some(_)) => ChangeType::New,
        (Some(_), None) => ChangeType::Resolved,
        (Some(b), Some(a)) if b.direction != a.direction => ChangeType::DirectionFlip,
        (Some(_), Some(_)) if confidence_delta >= DELTA_EPSILON => ChangeType::Strengthened,
        (Some(_), Some(_)) if confidence_delta <= -DELTA_EPSILON => ChangeType::Weakened,
        (Some(_), Some(_)) => ChangeType::Unchanged,
        (None, None) => unreachable!("id collected from one of the runs"),
    };

    ComparedNode {
        node_id: id.clone(),
        baseline_direction: before.map(|n| n.direction),
        intervention_direction: after.map(|n| n.direction),
        baseline_confidence,
        intervention_confidence,
        confidence_delta,
        change_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_model::{Delay, Direction, Magnitude};

    fn affected(id: &str, direction: Direction, confidence: f64) -> AffectedNode {
        AffectedNode {
            node_id: NodeId::from(id),
            direction,
            magnitude: Magnitude::from_confidence(confidence),
            confidence,
            timescale: Delay::Immediate,
            tick: 0,
        }
    }

    fn response(nodes: Vec<AffectedNode>) -> SimulationResponse {
        SimulationResponse {
            affected_nodes: nodes,
            ..SimulationResponse::default()
        }
    }

    #[test]
    fn test_classification_classes() {
        let baseline = response(vec![
            affected("a.gone", Direction::Up, 0.8),
            affected("a.flip", Direction::Up, 0.6),
            affected("a.weaker", Direction::Up, 0.9),
            affected("a.stronger", Direction::Down, 0.4),
            affected("a.same", Direction::Up, 0.5),
        ]);
        let intervention = response(vec![
            affected("a.new", Direction::Down, 0.7),
            affected("a.flip", Direction::Down, 0.6),
            affected("a.weaker", Direction::Up, 0.5),
            affected("a.stronger", Direction::Down, 0.9),
            affected("a.same", Direction::Up, 0.52),
        ]);

        let compared = classify(&baseline, &intervention);
        let by_id: std::collections::HashMap<&str, &ComparedNode> = compared
            .iter()
            .map(|c| (c.node_id.as_str(), c))
            .collect();

        assert_eq!(by_id["a.new"].change_type, ChangeType::New);
        assert_eq!(by_id["a.gone"].change_type, ChangeType::Resolved);
        assert_eq!(by_id["a.flip"].change_type, ChangeType::DirectionFlip);
        assert_eq!(by_id["a.weaker"].change_type, ChangeType::Weakened);
        assert_eq!(by_id["a.stronger"].change_type, ChangeType::Strengthened);
        assert_eq!(by_id["a.same"].change_type, ChangeType::Unchanged);

        // `unchanged` implies same direction and a delta inside the margin.
        let same = by_id["a.same"];
        assert_eq!(same.baseline_direction, same.intervention_direction);
        assert!(same.confidence_delta.abs() < DELTA_EPSILON);

        // Output is sorted by node id.
        let ids: Vec<&str> = compared.iter().map(|c| c.node_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_resolved_carries_zero_intervention_confidence() {
        let baseline = response(vec![affected("a.gone", Direction::Up, 0.8)]);
        let intervention = response(vec![]);
        let compared = classify(&baseline, &intervention);
        assert_eq!(compared.len(), 1);
        assert_eq!(compared[0].intervention_confidence, 0.0);
        assert!((compared[0].confidence_delta + 0.8).abs() < 1e-12);
        assert_eq!(compared[0].intervention_direction, None);
    }
}
