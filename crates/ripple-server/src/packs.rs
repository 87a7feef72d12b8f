//! Pack discovery on disk.
//!
//! The merger consumes parsed documents; this module walks a packs directory
//! and parses every `.yaml`/`.yml` file in a deterministic order.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use ripple_graph::{DocumentError, NamedDocument, PackDocument};

/// Errors that can occur while reading packs from disk.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("failed to read packs directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to walk packs directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Read every pack document under `dir`, sorted by file name for
/// reproducible merge order.
pub fn discover_documents(dir: &Path) -> Result<Vec<NamedDocument>, DiscoverError> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_pack = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if !is_pack {
            continue;
        }

        let origin = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .display()
            .to_string();
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            warn!(pack = %origin, "skipping empty pack file");
            continue;
        }

        let document = PackDocument::from_yaml(&origin, &content)?;
        debug!(
            pack = %origin,
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "pack discovered"
        );
        documents.push(NamedDocument::new(origin, document));
    }

    Ok(documents)
}
