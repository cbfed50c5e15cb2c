mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod retrieval;
mod routes;
mod state;
#[cfg(test)]
mod test_support;
mod ui;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "LLM endpoint: {} (model: {}, retries: {})",
        config.llm.api_url, config.llm.model, config.llm.max_retries
    );
    info!(
        "Retrieval: chunk {} words, overlap {}, top_k {}, whole document up to {} chunks",
        config.retrieval.chunk_size,
        config.retrieval.chunk_overlap,
        config.retrieval.similarity_top_k,
        config.retrieval.full_context_max_chunks
    );

    let port = config.port;
    let state = AppState::from_config(config);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the page is served behind a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
