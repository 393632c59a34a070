//! HTTP API server for shielded pool notes and withdrawal inputs.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod handlers;
mod routes;

use mixer_notes::NoteCodec;
use mixer_prover::MixerConfig;

const DEFAULT_LISTEN: &str = "0.0.0.0:3001";

/// Application state shared across handlers
pub struct AppState {
    pub config: MixerConfig,
    pub codec: NoteCodec,
}

impl AppState {
    pub fn new(config: MixerConfig) -> Self {
        let codec = config.note_codec();
        Self { config, codec }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting mixer proof server...");

    let config = MixerConfig::load()?;
    info!(
        tag = %config.tag,
        tree_height = config.merkle_tree_height,
        networks = config.deployments.len(),
        "configuration loaded"
    );

    let state = Arc::new(AppState::new(config));

    let addr: SocketAddr = std::env::var("MIXER_LISTEN")
        .unwrap_or_else(|_| DEFAULT_LISTEN.to_string())
        .parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
