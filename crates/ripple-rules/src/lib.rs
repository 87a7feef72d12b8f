//! Rule engine for the ripple reasoner.
//!
//! Rules carry a `when` boolean expression over context flags and user-seed
//! directions, and a `then` mapping that injects perturbations before
//! propagation begins. This crate parses the expression language, evaluates
//! it, and folds rule contributions into the effective perturbation set.

pub mod ast;
pub mod engine;
pub mod eval;
pub mod parser;

pub use ast::WhenExpr;
pub use engine::{apply_rules, SeedPerturbation};
pub use eval::evaluate;
pub use parser::{parse_when, WhenParseError};
