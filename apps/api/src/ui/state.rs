//! View state machine for the analyzer page.
//!
//! AwaitingInputs ──(key + file)──▶ ReadyToAnalyze ──(analyze)──▶ Analyzing
//! Analyzing ──(text)──▶ ShowingResult
//! Analyzing ──(empty | error)──▶ ShowingError
//!
//! Every transition is triggered by the user; nothing advances on its own.

use serde::Serialize;

use crate::analysis::form::MISSING_INPUTS_WARNING;
use crate::errors::AppError;

pub const EMPTY_RESULT_WARNING: &str =
    "No relevant information found in the resume. Please ensure the document is a valid CV or resume.";
pub const ERROR_PREFIX: &str = "An error occurred during analysis: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    AwaitingInputs,
    ReadyToAnalyze,
    Analyzing,
    ShowingResult { analysis: String },
    ShowingError { notice: Notice },
}

impl ViewState {
    /// State for the given inputs: both a non-blank key and a file are required.
    pub fn from_inputs(api_key: Option<&str>, has_upload: bool) -> Self {
        let has_key = api_key.is_some_and(|k| !k.trim().is_empty());
        if has_key && has_upload {
            ViewState::ReadyToAnalyze
        } else {
            ViewState::AwaitingInputs
        }
    }

    /// Pressing analyze only does something once the inputs are complete.
    pub fn analyze(self) -> Self {
        match self {
            ViewState::ReadyToAnalyze => ViewState::Analyzing,
            other => other,
        }
    }

    /// Applies the pipeline result. Ignored unless an analysis is running.
    pub fn complete(self, result: Result<String, AppError>) -> Self {
        if self != ViewState::Analyzing {
            return self;
        }
        match result {
            Ok(analysis) if !analysis.trim().is_empty() => ViewState::ShowingResult { analysis },
            Ok(_) | Err(AppError::EmptyAnalysis) => ViewState::ShowingError {
                notice: Notice::warning(EMPTY_RESULT_WARNING),
            },
            Err(AppError::Validation(message) | AppError::PayloadTooLarge(message)) => {
                ViewState::ShowingError {
                    notice: Notice::warning(message),
                }
            }
            Err(e) => ViewState::ShowingError {
                notice: Notice::error(format!("{ERROR_PREFIX}{e}")),
            },
        }
    }

    /// The banner to show in this state, if any.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            ViewState::AwaitingInputs => Some(Notice::warning(MISSING_INPUTS_WARNING)),
            ViewState::ShowingError { notice } => Some(notice.clone()),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ViewState::ShowingResult { .. } | ViewState::ShowingError { .. }
        )
    }
}
