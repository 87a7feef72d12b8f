//! Pack document schema and parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ripple_model::{Edge, Node, Rule, SummaryTemplate};

/// Errors that can occur when parsing a pack document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not valid YAML for the pack schema.
    #[error("failed to parse pack '{pack}': {source}")]
    Yaml {
        pack: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One parsed knowledge pack document.
///
/// All top-level keys are optional; a pack may carry only nodes, only edges,
/// or any mix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub summaries: Vec<SummaryTemplate>,
}

impl PackDocument {
    /// Parse a pack document from a YAML string.
    pub fn from_yaml(pack: &str, yaml: &str) -> Result<Self, DocumentError> {
        serde_yaml::from_str(yaml).map_err(|source| DocumentError::Yaml {
            pack: pack.to_string(),
            source,
        })
    }
}

/// A pack document tagged with its origin, so diagnostics can point at the
/// offending file.
#[derive(Debug, Clone)]
pub struct NamedDocument {
    pub origin: String,
    pub document: PackDocument,
}

impl NamedDocument {
    pub fn new(origin: impl Into<String>, document: PackDocument) -> Self {
        Self {
            origin: origin.into(),
            document,
        }
    }
}
