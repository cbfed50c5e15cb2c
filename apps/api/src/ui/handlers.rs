use axum::{
    extract::{Multipart, State},
    response::Html,
};
use tracing::debug;

use crate::analysis::form::AnalysisForm;
use crate::analysis::pipeline::{run_analysis, AnalysisSettings};
use crate::analysis::prompts::AnalysisKind;
use crate::state::AppState;
use crate::ui::render::render_page;
use crate::ui::state::ViewState;

/// GET /
pub async fn handle_index() -> Html<String> {
    Html(render_page(&ViewState::default(), AnalysisKind::default()))
}

/// POST /analyze
///
/// Drives the view state machine for one button press and renders where it lands.
/// Failures become page states; this handler never returns an error response.
pub async fn handle_analyze_page(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Html<String> {
    let form = match AnalysisForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            let view = ViewState::ReadyToAnalyze.analyze().complete(Err(e));
            return Html(render_page(&view, AnalysisKind::default()));
        }
    };

    let selected = form.kind;
    let view = ViewState::from_inputs(form.api_key(), form.has_upload());
    if view != ViewState::ReadyToAnalyze {
        return Html(render_page(&view, selected));
    }

    let view = view.analyze();
    let result = match form.into_inputs() {
        Ok((api_key, upload, kind)) => {
            let settings = AnalysisSettings::for_request(&state.config, api_key, kind);
            run_analysis(&state.llm, state.embedder.as_ref(), &settings, upload)
                .await
                .map(|outcome| outcome.analysis)
        }
        Err(e) => Err(e),
    };

    let view = view.complete(result);
    debug!("Analyze request finished (terminal: {})", view.is_terminal());
    Html(render_page(&view, selected))
}
