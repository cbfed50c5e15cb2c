use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::retrieval::embedder::{Embedder, HashingEmbedder, HttpEmbedder};

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; per-request choices travel in `AnalysisSettings`.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Pluggable embedding backend. HTTP when EMBEDDING_API_URL is set, local hashing otherwise.
    pub embedder: Arc<dyn Embedder>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let embedder: Arc<dyn Embedder> = match &config.embedding.api_url {
            Some(url) => Arc::new(HttpEmbedder::new(url.clone(), &config.embedding)),
            None => Arc::new(HashingEmbedder::new(config.embedding.dimension)),
        };
        info!(
            "Embedding backend: {} (dimension {})",
            embedder.backend(),
            embedder.dimension()
        );

        Self {
            llm: LlmClient::new(&config.llm),
            config,
            embedder,
        }
    }
}
