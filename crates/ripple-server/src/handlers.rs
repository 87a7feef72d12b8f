//! REST handlers for the reasoner endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info};

use ripple_engine::SimulateError;
use ripple_graph::merge_documents;
use ripple_model::{
    CompareRequest, CompareResponse, Edge, Node, Rule, SimulationOptions, SimulationRequest,
    SimulationResponse, SummaryTemplate,
};

use crate::packs::discover_documents;
use crate::state::AppState;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error wrapper carrying the response status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl From<SimulateError> for ApiError {
    fn from(err: SimulateError) -> Self {
        // Every current simulation error is a request problem; internal
        // invariants panic instead.
        ApiError::bad_request(err.to_string())
    }
}

/// View of the active graph returned by `GET /graph`.
#[derive(Debug, Serialize)]
pub struct GraphView {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub rules: Vec<Rule>,
    pub summaries: Vec<SummaryTemplate>,
}

/// Result body for `POST /reload`.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub warnings: Vec<String>,
}

/// GET `/graph` — nodes, edges, rules and summary templates of the active
/// graph.
pub async fn get_graph(State(state): State<AppState>) -> Json<GraphView> {
    let graph = state.graph().await;
    Json(GraphView {
        nodes: graph.nodes().cloned().collect(),
        edges: graph.edges().to_vec(),
        rules: graph.rules().to_vec(),
        summaries: graph.summaries().to_vec(),
    })
}

/// POST `/simulate` — run one propagation.
///
/// Returns `400` for unknown perturbation nodes or out-of-range options,
/// `200` with the simulation response otherwise.
pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, ApiError> {
    validate_options(&request.options)?;
    let graph = state.graph().await;
    let response = ripple_engine::simulate(&graph, &request)?;
    Ok(Json(response))
}

/// POST `/simulate/compare` — run baseline and intervention, diff them.
pub async fn compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, ApiError> {
    validate_options(&request.baseline.options)?;
    validate_options(&request.intervention.options)?;
    let graph = state.graph().await;
    let response = ripple_engine::compare(&graph, &request)?;
    Ok(Json(response))
}

/// POST `/reload` — rebuild the graph from the packs directory.
///
/// On failure the previous graph stays active and the first diagnostic is
/// returned with status `500`.
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let documents = discover_documents(&state.packs_dir).map_err(|err| {
        error!(%err, "pack discovery failed");
        ApiError::internal(err.to_string())
    })?;

    match merge_documents(&documents) {
        Ok(outcome) => {
            let node_count = outcome.graph.node_count();
            let edge_count = outcome.graph.edge_count();
            let warnings = outcome.warnings.iter().map(|w| w.to_string()).collect();
            state.swap_graph(outcome.graph).await;
            info!(node_count, edge_count, "graph reloaded");
            Ok(Json(ReloadResponse {
                status: "success".to_string(),
                node_count,
                edge_count,
                warnings,
            }))
        }
        Err(err) => {
            error!(%err, "reload failed; previous graph stays active");
            let detail = err
                .first()
                .map(|d| d.to_string())
                .unwrap_or_else(|| err.to_string());
            Err(ApiError::internal(detail))
        }
    }
}

fn validate_options(options: &SimulationOptions) -> Result<(), ApiError> {
    if options.max_hops < 1 {
        return Err(ApiError::bad_request("max_hops must be at least 1"));
    }
    if !(0.0..=1.0).contains(&options.min_confidence) {
        return Err(ApiError::bad_request("min_confidence must be in [0, 1]"));
    }
    if !(0.0..=1.0).contains(&options.conflict_epsilon) {
        return Err(ApiError::bad_request("conflict_epsilon must be in [0, 1]"));
    }
    Ok(())
}
