//! HTTP surface for the ripple reasoner.
//!
//! The engine itself is a pure function; this crate owns everything stateful
//! around it: pack discovery on disk, the atomically swappable graph handle,
//! and the axum router with the four endpoints
//! (`GET /graph`, `POST /simulate`, `POST /simulate/compare`,
//! `POST /reload`).

pub mod handlers;
pub mod packs;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/graph", get(handlers::get_graph))
        .route("/simulate", post(handlers::simulate))
        .route("/simulate/compare", post(handlers::compare))
        .route("/reload", post(handlers::reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
