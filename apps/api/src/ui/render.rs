//! Server-rendered HTML for the analyzer page.
//!
//! All text that can originate from a user or the model goes through `escape_html`.

use crate::analysis::prompts::AnalysisKind;
use crate::extraction::SUPPORTED_EXTENSIONS;
use crate::ui::state::{NoticeLevel, ViewState};

pub const PAGE_TITLE: &str = "Resume Analyzer";
pub const RESULTS_HEADING: &str = "Resume Analysis Results";
pub const ANALYZING_MESSAGE: &str = "Analyzing your resume...";

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, -apple-system, "Segoe UI", sans-serif; color: #1f2328; }
.layout { display: flex; min-height: 100vh; }
aside { width: 320px; padding: 24px; background: #f6f8fa; border-right: 1px solid #d0d7de; }
main { flex: 1; padding: 32px 48px; }
label { display: block; margin: 16px 0 6px; font-weight: 600; }
input, select, button { width: 100%; box-sizing: border-box; padding: 8px; font-size: 14px; }
button { margin-top: 20px; background: #ff4b4b; color: #fff; border: 0; border-radius: 6px; cursor: pointer; }
.notice { padding: 12px 16px; border-radius: 6px; }
.notice-warning { background: #fff8c5; border: 1px solid #d4a72c; }
.notice-error { background: #ffebe9; border: 1px solid #ff8182; }
.status { color: #57606a; }
.result { white-space: pre-wrap; line-height: 1.5; }
footer { margin-top: 32px; font-size: 12px; color: #57606a; }
"#;

/// Swaps the current status block for the analyzing indicator while the form posts.
const SUBMIT_SCRIPT: &str = r#"
document.getElementById("analyze-form").addEventListener("submit", function () {
  var tpl = document.getElementById("analyzing-template");
  document.getElementById("status").innerHTML = tpl.innerHTML;
});
"#;

/// Renders the full page for a state. `selected` keeps the chosen analysis across posts.
pub fn render_page(state: &ViewState, selected: AnalysisKind) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="layout">
<aside>
<h2>Configuration</h2>
{form}
<footer>Retrieval-augmented analysis with Groq-hosted models.</footer>
</aside>
<main>
<h1>{title}</h1>
<div id="status">{status}</div>
<template id="analyzing-template">{analyzing}</template>
</main>
</div>
<script>{script}</script>
</body>
</html>
"#,
        title = PAGE_TITLE,
        style = STYLE,
        form = render_form(selected),
        status = render_status(state),
        analyzing = render_status(&ViewState::Analyzing),
        script = SUBMIT_SCRIPT,
    )
}

/// The block shown in the main area for a state.
pub fn render_status(state: &ViewState) -> String {
    match state {
        ViewState::ReadyToAnalyze => {
            r#"<p class="status">Press <strong>Analyze Resume</strong> to start.</p>"#.to_string()
        }
        ViewState::Analyzing => format!(r#"<p class="status">{ANALYZING_MESSAGE}</p>"#),
        ViewState::ShowingResult { analysis } => format!(
            r#"<h3>{RESULTS_HEADING}</h3>
<div class="result">{}</div>"#,
            escape_html(analysis)
        ),
        ViewState::AwaitingInputs | ViewState::ShowingError { .. } => state
            .notice()
            .map(|notice| {
                let class = match notice.level {
                    NoticeLevel::Warning => "notice notice-warning",
                    NoticeLevel::Error => "notice notice-error",
                };
                format!(
                    r#"<div class="{class}" role="alert">{}</div>"#,
                    escape_html(&notice.message)
                )
            })
            .unwrap_or_default(),
    }
}

fn render_form(selected: AnalysisKind) -> String {
    let accept = SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");

    let options: String = AnalysisKind::ALL
        .iter()
        .map(|kind| {
            let marker = if *kind == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{marker}>{}</option>"#,
                kind.as_str(),
                escape_html(kind.label())
            )
        })
        .collect();

    // The API key input never gets a value attribute: the key is not echoed back.
    format!(
        r#"<form id="analyze-form" method="post" action="/analyze" enctype="multipart/form-data">
<label for="api_key">Enter your Groq API Key</label>
<input type="password" id="api_key" name="api_key" autocomplete="off">
<label for="resume">Upload your resume (PDF, DOCX, or TXT)</label>
<input type="file" id="resume" name="resume" accept="{accept}">
<label for="analysis">Analysis</label>
<select id="analysis" name="analysis">{options}</select>
<button type="submit">Analyze Resume</button>
</form>"#
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
