use std::path::Path;

use crate::extraction::ExtractionError;

/// Extracts the text of every page, in page order.
pub fn extract(path: &Path) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    Ok(join_pages(&pages))
}

/// Joins page texts with a newline so words at a page boundary never merge.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}
