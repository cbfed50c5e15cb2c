//! Axum route handlers for the JSON analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::analysis::form::AnalysisForm;
use crate::analysis::pipeline::{run_analysis, AnalysisOutcome, AnalysisSettings};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/analyze
///
/// Multipart form with `api_key`, `resume` (file) and optional `analysis`.
/// Returns the model's analysis verbatim alongside run metadata.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisOutcome>, AppError> {
    let form = AnalysisForm::from_multipart(multipart).await?;
    let (api_key, upload, kind) = form.into_inputs()?;

    let settings = AnalysisSettings::for_request(&state.config, api_key, kind);
    let outcome = run_analysis(&state.llm, state.embedder.as_ref(), &settings, upload).await?;

    Ok(Json(outcome))
}
