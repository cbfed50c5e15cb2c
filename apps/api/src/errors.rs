use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;
use crate::retrieval::RetrievalError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Embedding error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// The document had no text, or the model returned none.
    #[error("No relevant information found in the resume")]
    EmptyAnalysis,
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => AppError::EmptyAnalysis,
            other => AppError::Llm(other),
        }
    }
}

impl AppError {
    /// Status code and machine-readable code for the JSON error envelope.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
            }
            AppError::Extraction(ExtractionError::Unsupported(_)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FILE_TYPE")
            }
            AppError::Extraction(ExtractionError::Io(_) | ExtractionError::Task(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EXTRACTION_FAILED")
            }
            AppError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED"),
            AppError::Retrieval(_) => (StatusCode::BAD_GATEWAY, "EMBEDDING_ERROR"),
            AppError::Llm(e) => match e.status() {
                Some(401) | Some(403) => (StatusCode::UNAUTHORIZED, "LLM_UNAUTHORIZED"),
                Some(429) => (StatusCode::TOO_MANY_REQUESTS, "LLM_RATE_LIMITED"),
                _ => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
            },
            AppError::EmptyAnalysis => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_ANALYSIS"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                self.to_string()
            }
            AppError::Retrieval(e) => {
                tracing::error!("Embedding error: {e}");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
