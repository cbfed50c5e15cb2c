use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

pub const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-small-en";

/// Room for the multipart envelope and the text fields on top of the file itself.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; the LLM credential arrives with each request.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub max_upload_bytes: usize,
    /// Request body cap: the upload plus the multipart envelope and text fields.
    pub max_request_bytes: usize,
    pub upload_tmp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// OpenAI-compatible `/embeddings` endpoint. `None` selects the local hashing embedder.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words shared between neighbouring chunks.
    pub chunk_overlap: usize,
    pub similarity_top_k: usize,
    /// Documents with at most this many chunks are sent to the LLM whole.
    pub full_context_max_chunks: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_upload_mb: usize = parse_or(&lookup, "MAX_UPLOAD_MB", 10)?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .with_context(|| format!("MAX_UPLOAD_MB is too large: {max_upload_mb}"))?;
        let max_request_bytes = max_upload_bytes
            .checked_add(FORM_OVERHEAD_BYTES)
            .with_context(|| format!("MAX_UPLOAD_MB is too large: {max_upload_mb}"))?;

        let config = Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm: LlmConfig {
                api_url: lookup("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
                model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", 1024)?,
                timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?,
                max_retries: parse_or(&lookup, "LLM_MAX_RETRIES", 0)?,
            },
            embedding: EmbeddingConfig {
                api_url: non_empty(lookup("EMBEDDING_API_URL")),
                api_key: non_empty(lookup("EMBEDDING_API_KEY")),
                model: lookup("EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                dimension: parse_or(&lookup, "EMBEDDING_DIM", 384)?,
            },
            retrieval: RetrievalConfig {
                chunk_size: parse_or(&lookup, "CHUNK_SIZE", 750)?,
                chunk_overlap: parse_or(&lookup, "CHUNK_OVERLAP", 20)?,
                similarity_top_k: parse_or(&lookup, "SIMILARITY_TOP_K", 2)?,
                full_context_max_chunks: parse_or(&lookup, "FULL_CONTEXT_MAX_CHUNKS", 4)?,
            },
            max_upload_bytes,
            max_request_bytes,
            upload_tmp_dir: non_empty(lookup("UPLOAD_TMP_DIR")).map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.retrieval.chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than 0");
        }
        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            bail!("CHUNK_OVERLAP must be smaller than CHUNK_SIZE");
        }
        if self.retrieval.similarity_top_k == 0 {
            bail!("SIMILARITY_TOP_K must be greater than 0");
        }
        if self.embedding.dimension == 0 {
            bail!("EMBEDDING_DIM must be greater than 0");
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.llm.api_url, DEFAULT_LLM_API_URL);
        assert_eq!(config.llm.model, DEFAULT_LLM_MODEL);
        assert_eq!(config.llm.max_retries, 0);
        assert!(config.embedding.api_url.is_none());
        assert_eq!(config.embedding.dimension, 384);
        assert_eq!(config.retrieval.chunk_size, 750);
        assert_eq!(config.retrieval.chunk_overlap, 20);
        assert_eq!(config.retrieval.similarity_top_k, 2);
        assert_eq!(config.retrieval.full_context_max_chunks, 4);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(
            config.max_request_bytes,
            10 * 1024 * 1024 + FORM_OVERHEAD_BYTES
        );
        assert!(config.upload_tmp_dir.is_none());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("LLM_MODEL", "llama-3.1-8b-instant"),
            ("EMBEDDING_API_URL", "http://localhost:8081/v1/embeddings"),
            ("CHUNK_SIZE", "100"),
            ("CHUNK_OVERLAP", "10"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(
            config.embedding.api_url.as_deref(),
            Some("http://localhost:8081/v1/embeddings")
        );
        assert_eq!(config.retrieval.chunk_size, 100);
        assert_eq!(config.retrieval.chunk_overlap, 10);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[("EMBEDDING_API_URL", "  "), ("PORT", "")]))
            .unwrap();
        assert!(config.embedding.api_url.is_none());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let result = Config::from_lookup(lookup_from(&[
            ("CHUNK_SIZE", "50"),
            ("CHUNK_OVERLAP", "50"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_upload_limit_is_a_startup_error() {
        let huge = usize::MAX.to_string();
        let err = Config::from_lookup(lookup_from(&[("MAX_UPLOAD_MB", huge.as_str())]))
            .unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_MB"));
    }

    #[test]
    fn test_zero_top_k_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("SIMILARITY_TOP_K", "0")])).is_err());
    }
}
