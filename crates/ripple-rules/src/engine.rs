//! Folding rule contributions into the effective perturbation set.

use indexmap::IndexMap;
use tracing::debug;

use ripple_model::{Direction, NodeId, PerturbationOp, Rule};

use crate::eval::evaluate;
use crate::parser::parse_when;

/// A perturbation whose node identifier has already been resolved to a
/// canonical id. User perturbations and rule contributions both reduce to
/// this form before propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPerturbation {
    pub node_id: NodeId,
    pub op: PerturbationOp,
    pub value: Option<f64>,
}

/// Evaluate every rule once against (context ∪ user seeds) and return the
/// effective perturbation set.
///
/// Precedence: user perturbations always win for their node; among rules the
/// first contribution in pack order wins. Rules whose `when` fails to parse
/// are skipped (the loader already warned about them).
pub fn apply_rules(
    rules: &[Rule],
    context: &IndexMap<String, bool>,
    user: &[SeedPerturbation],
    user_directions: &IndexMap<NodeId, Direction>,
) -> Vec<SeedPerturbation> {
    let mut effective: Vec<SeedPerturbation> = user.to_vec();
    let mut claimed: Vec<NodeId> = user.iter().map(|p| p.node_id.clone()).collect();

    for rule in rules {
        let expr = match parse_when(&rule.when) {
            Ok(expr) => expr,
            Err(err) => {
                debug!(rule = %rule.id, %err, "skipping unparseable rule");
                continue;
            }
        };
        if !evaluate(&expr, context, user_directions) {
            continue;
        }
        debug!(rule = %rule.id, "rule fired");
        for (node_id, op) in &rule.then {
            if claimed.contains(node_id) {
                continue;
            }
            claimed.push(node_id.clone());
            effective.push(SeedPerturbation {
                node_id: node_id.clone(),
                op: *op,
                value: None,
            });
        }
    }

    effective
}
