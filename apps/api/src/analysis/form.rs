//! The analysis form as posted by the page (and by API clients): `api_key`, `resume`, `analysis`.

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;

use crate::analysis::prompts::AnalysisKind;
use crate::errors::AppError;
use crate::extraction::Upload;

pub const MISSING_INPUTS_WARNING: &str = "Please enter your Groq API key and upload a resume.";

#[derive(Default)]
pub struct AnalysisForm {
    pub api_key: Option<String>,
    pub upload: Option<Upload>,
    pub kind: AnalysisKind,
}

impl std::fmt::Debug for AnalysisForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisForm")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("upload", &self.upload.as_ref().map(|u| &u.file_name))
            .field("kind", &self.kind)
            .finish()
    }
}

impl AnalysisForm {
    /// Reads every field of the multipart body. Unknown fields are ignored; a
    /// file input submitted without a chosen file counts as no upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalysisForm::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "api_key" => form.api_key = Some(field.text().await.map_err(invalid_form)?),
                "analysis" => {
                    let raw = field.text().await.map_err(invalid_form)?;
                    form.kind = raw.parse().map_err(AppError::Validation)?;
                }
                "resume" => form.upload = read_upload(field).await?,
                _ => {}
            }
        }

        Ok(form)
    }

    /// The API key, trimmed, if one was entered.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn has_upload(&self) -> bool {
        self.upload.is_some()
    }

    /// Splits the form into credential and upload, or fails when either is missing.
    pub fn into_inputs(self) -> Result<(String, Upload, AnalysisKind), AppError> {
        let api_key = self.api_key().map(str::to_string);
        match (api_key, self.upload) {
            (Some(key), Some(upload)) => Ok((key, upload, self.kind)),
            _ => Err(AppError::Validation(MISSING_INPUTS_WARNING.to_string())),
        }
    }
}

async fn read_upload(field: Field<'_>) -> Result<Option<Upload>, AppError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|n| !n.trim().is_empty());
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(invalid_form)?;

    Ok(file_name.map(|name| Upload::new(name, content_type, bytes)))
}

fn invalid_form(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(err.body_text());
    }
    AppError::Validation(format!("Invalid form data: {err}"))
}
