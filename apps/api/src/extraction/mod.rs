//! Text extraction: turns an uploaded resume (PDF, DOCX or plain text) into a string.
//!
//! Every upload is staged to a request-owned temporary file that is removed
//! when the staging guard drops, whether or not extraction succeeds.

pub mod docx;
pub mod pdf;
pub mod text;

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

/// Extensions accepted by the upload form.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Upload a PDF, DOCX or TXT file")]
    Unsupported(String),

    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to read DOCX: {0}")]
    Docx(String),

    #[error("File is not valid UTF-8 text")]
    Encoding,

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Media type of an upload, which selects the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Pdf,
    Docx,
    PlainText,
}

impl MediaType {
    /// Maps a declared MIME type. Anything unrecognised is read as plain text.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => MediaType::Pdf,
            DOCX_MIME => MediaType::Docx,
            _ => MediaType::PlainText,
        }
    }

    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => MediaType::Pdf,
            "docx" => MediaType::Docx,
            _ => MediaType::PlainText,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => PDF_MIME,
            MediaType::Docx => DOCX_MIME,
            MediaType::PlainText => TEXT_MIME,
        }
    }
}

/// A file received from the upload form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension of the uploaded file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Rejects files whose extension the upload form does not accept.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        match self.extension() {
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(ExtractionError::Unsupported(self.file_name.clone())),
        }
    }

    /// The declared content type wins; generic or missing types fall back to the extension.
    pub fn media_type(&self) -> MediaType {
        match self.content_type.as_deref().map(str::trim) {
            Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
                MediaType::from_mime(mime)
            }
            _ => self
                .extension()
                .map(|ext| MediaType::from_extension(&ext))
                .unwrap_or(MediaType::PlainText),
        }
    }
}

/// Extracts text from an upload on the blocking pool.
/// Decoder panics are reported as extraction errors.
pub async fn extract_text(
    upload: Upload,
    tmp_dir: Option<PathBuf>,
) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_upload(&upload, tmp_dir.as_deref()))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

/// Stages the upload to a temporary file and runs the matching extractor on it.
pub fn extract_upload(upload: &Upload, tmp_dir: Option<&Path>) -> Result<String, ExtractionError> {
    let media_type = upload.media_type();
    let staged = stage_upload(upload, tmp_dir)?;

    debug!(
        "Extracting {} bytes as {:?} from {}",
        upload.bytes.len(),
        media_type,
        staged.path().display()
    );

    // `staged` is dropped (and the file removed) on both paths out of this function.
    extract_file(staged.path(), media_type)
}

pub fn extract_file(path: &Path, media_type: MediaType) -> Result<String, ExtractionError> {
    match media_type {
        MediaType::Pdf => pdf::extract(path),
        MediaType::Docx => docx::extract(path),
        MediaType::PlainText => text::extract(path),
    }
}

fn stage_upload(upload: &Upload, tmp_dir: Option<&Path>) -> Result<NamedTempFile, ExtractionError> {
    let suffix = upload
        .extension()
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    let mut builder = tempfile::Builder::new();
    builder.prefix("resume_").suffix(&suffix);

    let mut file = match tmp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(&upload.bytes)?;
    file.flush()?;
    Ok(file)
}
