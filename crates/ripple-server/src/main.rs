//! ripple-server - serves the physiology reasoner over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ripple_graph::merge_documents;
use ripple_server::packs::discover_documents;
use ripple_server::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "ripple-server")]
#[command(about = "Qualitative physiology reasoner over knowledge packs")]
struct Cli {
    /// Directory containing knowledge pack YAML files
    #[arg(long, default_value = "packs")]
    packs: PathBuf,

    /// TCP address to bind
    #[arg(long, default_value = "0.0.0.0:8060")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Loading knowledge packs from: {}", cli.packs.display());

    let documents = match discover_documents(&cli.packs) {
        Ok(documents) => documents,
        Err(err) => {
            error!("Failed to read knowledge packs: {err}");
            std::process::exit(1);
        }
    };

    let outcome = match merge_documents(&documents) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Failed to build knowledge graph:\n{err}");
            std::process::exit(1);
        }
    };
    for warning in &outcome.warnings {
        tracing::warn!("{warning}");
    }

    info!(
        nodes = outcome.graph.node_count(),
        edges = outcome.graph.edge_count(),
        rules = outcome.graph.rules().len(),
        "knowledge graph ready"
    );

    let state = AppState::new(cli.packs, outcome.graph);
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(cli.bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {err}", cli.bind);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", cli.bind);

    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {err}");
        std::process::exit(1);
    }
}
