//! Query engine: retrieve the closest chunks for a query, then ask the LLM.

use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::prompts::{context_qa_prompt, CONTEXT_QA_SYSTEM};
use crate::llm_client::LlmClient;
use crate::retrieval::embedder::Embedder;
use crate::retrieval::index::VectorIndex;
use crate::retrieval::{RetrievalError, RetrievalSettings};

/// Where a query goes and who pays for it. Built per request.
#[derive(Clone, Copy)]
pub struct LlmTarget<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
}

pub struct QueryEngine<'a> {
    llm: &'a LlmClient,
    embedder: &'a dyn Embedder,
    similarity_top_k: usize,
    full_context_max_chunks: usize,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        llm: &'a LlmClient,
        embedder: &'a dyn Embedder,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            llm,
            embedder,
            similarity_top_k: settings.similarity_top_k,
            full_context_max_chunks: settings.full_context_max_chunks,
        }
    }

    /// The context block for a query. A document of at most
    /// `full_context_max_chunks` chunks is passed whole, in document order;
    /// longer ones contribute their top-k chunks in rank order.
    pub async fn retrieve_context(
        &self,
        index: &VectorIndex,
        query: &str,
    ) -> Result<String, AppError> {
        if index.len() <= self.full_context_max_chunks {
            debug!("Using all {} chunks as context", index.len());
            return Ok(index
                .chunks()
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"));
        }

        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Malformed("no embedding for query".to_string()))?;

        let hits = index.retrieve(&query_vector, self.similarity_top_k)?;
        debug!(
            "Retrieved {} of {} chunks (distances: {:?})",
            hits.len(),
            index.len(),
            hits.iter().map(|h| h.distance).collect::<Vec<_>>()
        );

        Ok(hits
            .into_iter()
            .map(|h| h.chunk.text)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Runs the query against the index and returns the LLM's answer verbatim (trimmed).
    pub async fn query(
        &self,
        index: &VectorIndex,
        query: &str,
        target: LlmTarget<'_>,
    ) -> Result<String, AppError> {
        let context = self.retrieve_context(index, query).await?;
        let prompt = context_qa_prompt(&context, query);

        let answer = self
            .llm
            .complete(target.api_key, target.model, &prompt, CONTEXT_QA_SYSTEM)
            .await?;
        Ok(answer)
    }
}
