//! Knowledge-pack loading and the canonical graph.
//!
//! Packs are YAML documents declaring `nodes`, `edges`, `rules` and
//! `summaries`. The merger consumes an ordered list of parsed documents,
//! validates them, merges duplicates, resolves aliases, and produces a single
//! immutable [`Graph`] plus a diagnostics list. Simulations share the graph
//! read-only; a reload builds a whole new value.

pub mod context;
pub mod diagnostics;
pub mod document;
pub mod graph;
pub mod merge;

pub use context::edge_is_live;
pub use diagnostics::{Diagnostic, LoadError, Severity};
pub use document::{DocumentError, NamedDocument, PackDocument};
pub use graph::Graph;
pub use merge::{merge_documents, MergeOutcome};
