//! One analysis run: extract, index, query. Nothing survives between runs.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::engine::{LlmTarget, QueryEngine};
use crate::analysis::prompts::AnalysisKind;
use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::{extract_text, MediaType, Upload};
use crate::llm_client::LlmClient;
use crate::retrieval::embedder::Embedder;
use crate::retrieval::{build_index, RetrievalSettings};

/// Everything one run needs, passed explicitly instead of living in shared state.
#[derive(Clone)]
pub struct AnalysisSettings {
    pub api_key: String,
    pub model: String,
    pub kind: AnalysisKind,
    pub retrieval: RetrievalSettings,
    pub tmp_dir: Option<PathBuf>,
}

impl std::fmt::Debug for AnalysisSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("kind", &self.kind)
            .field("retrieval", &self.retrieval)
            .field("tmp_dir", &self.tmp_dir)
            .finish()
    }
}

impl AnalysisSettings {
    pub fn for_request(config: &Config, api_key: String, kind: AnalysisKind) -> Self {
        Self {
            api_key,
            model: config.llm.model.clone(),
            kind,
            retrieval: RetrievalSettings::from(&config.retrieval),
            tmp_dir: config.upload_tmp_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub request_id: Uuid,
    pub analysis_kind: AnalysisKind,
    pub model: String,
    pub media_type: MediaType,
    pub chunks_indexed: usize,
    /// The model's free text, shown verbatim.
    pub analysis: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Runs the full pipeline for one upload.
pub async fn run_analysis(
    llm: &LlmClient,
    embedder: &dyn Embedder,
    settings: &AnalysisSettings,
    upload: Upload,
) -> Result<AnalysisOutcome, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analysis", %request_id, kind = %settings.kind);

    async move {
        let started = Instant::now();
        upload.validate()?;
        let media_type = upload.media_type();

        info!(
            "Analyzing {} ({} bytes, {})",
            upload.file_name,
            upload.bytes.len(),
            media_type.mime()
        );

        let text = extract_text(upload, settings.tmp_dir.clone()).await?;
        if text.trim().is_empty() {
            info!("Upload contained no text");
            return Err(AppError::EmptyAnalysis);
        }

        let index = build_index(&text, embedder, &settings.retrieval).await?;
        let engine = QueryEngine::new(llm, embedder, settings.retrieval);
        let analysis = engine
            .query(
                &index,
                settings.kind.prompt(),
                LlmTarget {
                    api_key: &settings.api_key,
                    model: &settings.model,
                },
            )
            .await?;

        info!(
            "Analysis complete: {} chars of text, {} chunks, {} chars of output in {}ms",
            text.len(),
            index.len(),
            analysis.len(),
            started.elapsed().as_millis()
        );

        Ok(AnalysisOutcome {
            request_id,
            analysis_kind: settings.kind,
            model: settings.model.clone(),
            media_type,
            chunks_indexed: index.len(),
            analysis,
            analyzed_at: Utc::now(),
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionError;
    use crate::retrieval::embedder::HashingEmbedder;
    use crate::test_support::{echo_llm_router, spawn_stub, test_config, STUB_API_KEY};

    async fn setup() -> (Config, LlmClient, HashingEmbedder) {
        let base = spawn_stub(echo_llm_router()).await;
        let config = test_config(&base);
        let llm = LlmClient::new(&config.llm);
        let embedder = HashingEmbedder::new(config.embedding.dimension);
        (config, llm, embedder)
    }

    fn settings(config: &Config, api_key: &str) -> AnalysisSettings {
        AnalysisSettings::for_request(config, api_key.to_string(), AnalysisKind::Comprehensive)
    }

    #[tokio::test]
    async fn test_text_resume_produces_non_empty_analysis() {
        let (config, llm, embedder) = setup().await;
        let upload = Upload::new(
            "resume.txt",
            Some("text/plain".into()),
            "John Doe, 5 years experience as a backend engineer",
        );

        let outcome = run_analysis(&llm, &embedder, &settings(&config, STUB_API_KEY), upload)
            .await
            .unwrap();

        assert!(!outcome.analysis.is_empty());
        assert!(outcome.analysis.contains("John Doe"));
        assert_eq!(outcome.chunks_indexed, 1);
        assert_eq!(outcome.media_type, MediaType::PlainText);
        assert_eq!(outcome.model, config.llm.model);
    }

    #[tokio::test]
    async fn test_consecutive_runs_do_not_share_state() {
        let (config, llm, embedder) = setup().await;
        let settings = settings(&config, STUB_API_KEY);

        let first = run_analysis(
            &llm,
            &embedder,
            &settings,
            Upload::new("a.txt", None, "Alice Smith, nurse practitioner"),
        )
        .await
        .unwrap();
        let second = run_analysis(
            &llm,
            &embedder,
            &settings,
            Upload::new("b.txt", None, "Bob Jones, civil engineer"),
        )
        .await
        .unwrap();

        assert!(first.analysis.contains("Alice Smith"));
        assert!(second.analysis.contains("Bob Jones"));
        assert!(!second.analysis.contains("Alice"));
        assert_ne!(first.request_id, second.request_id);
    }

    #[tokio::test]
    async fn test_blank_document_is_empty_analysis_without_llm_call() {
        // Port 9 is never listening; reaching the LLM would be an Llm error instead.
        let config = test_config("http://127.0.0.1:9");
        let llm = LlmClient::new(&config.llm);
        let embedder = HashingEmbedder::new(config.embedding.dimension);

        let result = run_analysis(
            &llm,
            &embedder,
            &settings(&config, STUB_API_KEY),
            Upload::new("blank.txt", None, "  \n "),
        )
        .await;

        assert!(matches!(result, Err(AppError::EmptyAnalysis)));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected_before_extraction() {
        let (config, llm, embedder) = setup().await;
        let result = run_analysis(
            &llm,
            &embedder,
            &settings(&config, STUB_API_KEY),
            Upload::new("resume.rtf", None, "{\\rtf1 hello}"),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Extraction(ExtractionError::Unsupported(_)))
        ));
    }

    #[tokio::test]
    async fn test_invalid_credentials_are_a_non_fatal_error() {
        let (config, llm, embedder) = setup().await;
        let result = run_analysis(
            &llm,
            &embedder,
            &settings(&config, "gsk_wrong"),
            Upload::new("resume.txt", None, "Jane Roe"),
        )
        .await;

        match result {
            Err(AppError::Llm(e)) => assert_eq!(e.status(), Some(401)),
            other => panic!("expected LLM auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_settings_debug_redacts_api_key() {
        let config = test_config("http://127.0.0.1:9");
        let settings = settings(&config, "gsk_topsecret");
        assert!(!format!("{settings:?}").contains("gsk_topsecret"));
    }
}
