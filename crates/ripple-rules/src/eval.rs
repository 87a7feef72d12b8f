//! Pure evaluation of `when` expressions.

use indexmap::IndexMap;

use ripple_model::{Direction, NodeId};

use crate::ast::WhenExpr;

/// Evaluate an expression against the request context and the user-seed
/// directions. Context flags absent from the map read as `false`.
pub fn evaluate(
    expr: &WhenExpr,
    context: &IndexMap<String, bool>,
    seeds: &IndexMap<NodeId, Direction>,
) -> bool {
    match expr {
        WhenExpr::Literal(value) => *value,
        WhenExpr::ContextFlag(flag) => context.get(flag).copied().unwrap_or(false),
        WhenExpr::NodeDirection { node, direction } => {
            seeds.get(node).is_some_and(|d| d == direction)
        }
        WhenExpr::Not(inner) => !evaluate(inner, context, seeds),
        WhenExpr::And(left, right) => {
            evaluate(left, context, seeds) && evaluate(right, context, seeds)
        }
        WhenExpr::Or(left, right) => {
            evaluate(left, context, seeds) || evaluate(right, context, seeds)
        }
    }
}
