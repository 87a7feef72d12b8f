//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use ripple_graph::Graph;

/// Shared state behind the axum handlers.
///
/// The graph handle is an `Arc` inside an `RwLock`: readers clone the inner
/// `Arc` and drop the lock immediately, so a simulation keeps the exact
/// graph it started with while a reload swaps in a whole new value in one
/// step. The previous graph stays alive until its last reader is done.
pub struct AppState {
    /// Directory the packs were discovered in; reload re-walks it.
    pub packs_dir: PathBuf,
    /// Currently active graph.
    pub graph: Arc<RwLock<Arc<Graph>>>,
}

impl AppState {
    pub fn new(packs_dir: PathBuf, graph: Graph) -> Self {
        Self {
            packs_dir,
            graph: Arc::new(RwLock::new(Arc::new(graph))),
        }
    }

    /// Snapshot of the active graph.
    pub async fn graph(&self) -> Arc<Graph> {
        self.graph.read().await.clone()
    }

    /// Atomically replace the active graph.
    pub async fn swap_graph(&self, graph: Graph) {
        *self.graph.write().await = Arc::new(graph);
    }
}

/// Clones `AppState` by cloning `Arc` pointers, not the underlying data.
impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            packs_dir: self.packs_dir.clone(),
            graph: Arc::clone(&self.graph),
        }
    }
}
