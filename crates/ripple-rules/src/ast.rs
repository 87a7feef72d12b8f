//! Abstract syntax tree for rule `when` expressions.

use ripple_model::{Direction, NodeId};

/// A parsed `when` expression.
///
/// Grammar (lowest precedence first):
///
/// ```text
/// expr := and ("or" and)*
/// and  := not ("and" not)*
/// not  := "not" not | atom
/// atom := "true" | "false" | "ctx." flag
///       | node_id ".up" | node_id ".down"
///       | "(" expr ")"
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum WhenExpr {
    /// `true` / `false`
    Literal(bool),
    /// `ctx.<flag>` — true iff the request context sets the flag true.
    ContextFlag(String),
    /// `<node_id>.up` / `<node_id>.down` — true iff the node is a user seed
    /// with that direction.
    NodeDirection { node: NodeId, direction: Direction },
    Not(Box<WhenExpr>),
    And(Box<WhenExpr>, Box<WhenExpr>),
    Or(Box<WhenExpr>, Box<WhenExpr>),
}
