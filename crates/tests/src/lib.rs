//! Integration test harness for the ripple reasoner.
//!
//! Loads the shipped knowledge packs and runs simulations end to end:
//! discover packs → merge → rules → propagate → traces.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use ripple_engine::simulate;
use ripple_graph::{merge_documents, Graph};
use ripple_model::{
    AffectedNode, Direction, Perturbation, PerturbationOp, SimulationOptions, SimulationRequest,
    SimulationResponse,
};
use ripple_server::packs::discover_documents;

/// Directory holding the shipped knowledge packs.
pub fn packs_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../packs")
}

/// Discover and merge the shipped packs.
///
/// # Panics
///
/// Panics if discovery or the merge fails; the shipped packs must always be
/// clean.
pub fn load_shipped_graph() -> Graph {
    let documents = discover_documents(&packs_dir()).expect("packs directory readable");
    let outcome = merge_documents(&documents).expect("shipped packs merge cleanly");
    assert!(
        outcome.warnings.is_empty(),
        "shipped packs produced warnings: {:?}",
        outcome.warnings
    );
    outcome.graph
}

/// Test harness bundling the shipped graph with request helpers.
pub struct ScenarioHarness {
    graph: Graph,
}

impl Default for ScenarioHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioHarness {
    pub fn new() -> Self {
        Self {
            graph: load_shipped_graph(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Run a request, panicking on simulation errors.
    pub fn simulate(&self, request: &SimulationRequest) -> SimulationResponse {
        simulate(&self.graph, request).expect("simulation succeeds")
    }

    /// Request builder over string node ids and context flags.
    pub fn request(
        &self,
        perturbations: &[(&str, PerturbationOp)],
        context: &[(&str, bool)],
        max_hops: u32,
    ) -> SimulationRequest {
        SimulationRequest {
            perturbations: perturbations
                .iter()
                .map(|(node_id, op)| Perturbation {
                    node_id: node_id.to_string(),
                    op: *op,
                    value: None,
                })
                .collect(),
            context: context
                .iter()
                .map(|(flag, value)| (flag.to_string(), *value))
                .collect::<IndexMap<String, bool>>(),
            options: SimulationOptions {
                max_hops,
                ..SimulationOptions::default()
            },
        }
    }
}

/// Affected node by id, if present.
pub fn affected<'a>(response: &'a SimulationResponse, node_id: &str) -> Option<&'a AffectedNode> {
    response
        .affected_nodes
        .iter()
        .find(|n| n.node_id.as_str() == node_id)
}

/// Direction of an affected node, if present.
pub fn direction_of(response: &SimulationResponse, node_id: &str) -> Option<Direction> {
    affected(response, node_id).map(|n| n.direction)
}
