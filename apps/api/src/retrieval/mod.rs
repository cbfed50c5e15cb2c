//! Retrieval: chunk the document, embed the chunks, store them in an exact L2 index.

pub mod chunker;
pub mod embedder;
pub mod index;

use thiserror::Error;
use tracing::debug;

use crate::config::RetrievalConfig;
use crate::retrieval::chunker::split_into_chunks;
use crate::retrieval::embedder::Embedder;
use crate::retrieval::index::VectorIndex;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed embedding response: {0}")]
    Malformed(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Chunking and search parameters for one analysis run.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub similarity_top_k: usize,
    /// At or below this many chunks the whole document is the context.
    pub full_context_max_chunks: usize,
}

impl From<&RetrievalConfig> for RetrievalSettings {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            similarity_top_k: config.similarity_top_k,
            full_context_max_chunks: config.full_context_max_chunks,
        }
    }
}

/// Builds a fresh index over one document.
pub async fn build_index(
    text: &str,
    embedder: &dyn Embedder,
    settings: &RetrievalSettings,
) -> Result<VectorIndex, RetrievalError> {
    let chunks = split_into_chunks(text, settings.chunk_size, settings.chunk_overlap);
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed(&texts).await?;

    if vectors.len() != chunks.len() {
        return Err(RetrievalError::Malformed(format!(
            "expected {} embeddings, received {}",
            chunks.len(),
            vectors.len()
        )));
    }

    let mut index = VectorIndex::new(embedder.dimension());
    for (chunk, vector) in chunks.into_iter().zip(vectors) {
        index.insert(chunk, vector)?;
    }

    debug!(
        "Indexed {} chunks (dimension {}, backend {})",
        index.len(),
        index.dimension(),
        embedder.backend()
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::embedder::HashingEmbedder;
    use async_trait::async_trait;

    const SETTINGS: RetrievalSettings = RetrievalSettings {
        chunk_size: 8,
        chunk_overlap: 2,
        similarity_top_k: 2,
        full_context_max_chunks: 0,
    };

    struct WrongDimensionEmbedder;

    #[async_trait]
    impl Embedder for WrongDimensionEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
            Ok(texts.iter().map(|_| vec![0.0; 3]).collect())
        }

        fn dimension(&self) -> usize {
            768
        }

        fn backend(&self) -> &str {
            "wrong"
        }
    }

    #[tokio::test]
    async fn test_single_short_document_is_one_entry() {
        let embedder = HashingEmbedder::new(64);
        let index = build_index(
            "John Doe, 5 years experience as a backend engineer",
            &embedder,
            &RetrievalSettings {
                chunk_size: 100,
                ..SETTINGS
            },
        )
        .await
        .unwrap();

        assert_eq!(index.len(), 1);
        let query = embedder.embed_one("completely unrelated query about gardening");
        let hits = index.retrieve(&query, 2).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].chunk.text.starts_with("John Doe"));
    }

    #[tokio::test]
    async fn test_long_document_retrieves_relevant_chunk_first() {
        let embedder = HashingEmbedder::new(512);
        let text = "Education: BSc Computer Science, State University. \
                    Hobbies: climbing, chess, cooking, travel. \
                    Experience: backend engineer building Rust services for payments.";
        let index = build_index(text, &embedder, &SETTINGS).await.unwrap();
        assert!(index.len() > 1);

        let query = embedder.embed_one("backend engineer Rust services experience");
        let hits = index.retrieve(&query, 1).unwrap();
        assert!(hits[0].chunk.text.contains("backend"));
    }

    #[tokio::test]
    async fn test_blank_document_builds_empty_index() {
        let embedder = HashingEmbedder::new(16);
        let index = build_index("   ", &embedder, &SETTINGS).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_surfaces_as_error() {
        let result = build_index("some resume text", &WrongDimensionEmbedder, &SETTINGS).await;
        assert!(matches!(
            result,
            Err(RetrievalError::DimensionMismatch { expected: 768, actual: 3 })
        ));
    }
}
