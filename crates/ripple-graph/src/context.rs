//! Context gate.
//!
//! The only hook by which patient state conditionally alters the graph: an
//! edge lists context-flag requirements, and is live iff every requirement
//! matches the request context.

use indexmap::IndexMap;

use ripple_model::Edge;

/// Whether an edge participates under the given context.
///
/// Flags absent from the context read as `false`, so an edge requiring
/// `flag: false` is live by default and dies when the flag is switched on.
pub fn edge_is_live(edge: &Edge, context: &IndexMap<String, bool>) -> bool {
    edge.context
        .iter()
        .all(|(flag, required)| context.get(flag).copied().unwrap_or(false) == *required)
}
