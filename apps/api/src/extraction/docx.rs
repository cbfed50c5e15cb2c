//! DOCX extractor.
//!
//! A DOCX file is a ZIP archive; the body lives in `word/document.xml`.
//! Each `<w:p>` paragraph becomes one output line.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use zip::ZipArchive;

use crate::extraction::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Matches opening, closing and self-closing element tags. Declarations and
/// comments (`<?`, `<!`) never match because a name must start with a letter.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9_.:-]*)[^>]*?(/?)>").expect("static tag regex")
});

pub fn extract(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| ExtractionError::Docx(format!("{DOCUMENT_PART} not found")))?
        .read_to_string(&mut xml)?;

    Ok(paragraphs_from_xml(&xml).join("\n"))
}

/// Collects paragraph texts in document order. Empty paragraphs are kept as
/// empty strings so the line structure of the document survives.
///
/// Text boxes (`w:txbxContent`) nest whole paragraphs inside a run of another
/// paragraph. Each nested paragraph becomes its own line, emitted when it
/// closes, and the surrounding paragraph keeps its own text. The legacy copy of
/// a text box under `mc:Fallback` is skipped so it is not read twice.
pub fn paragraphs_from_xml(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    // Innermost paragraph last.
    let mut open: Vec<OpenParagraph> = Vec::new();
    let mut in_text = false;
    let mut fallback_depth = 0usize;
    let mut cursor = 0;

    for caps in TAG.captures_iter(xml) {
        let Some(whole) = caps.get(0) else { continue };

        if in_text && fallback_depth == 0 {
            if let Some(paragraph) = open.last_mut() {
                paragraph.text.push_str(&unescape(&xml[cursor..whole.start()]));
            }
        }
        cursor = whole.end();

        let name = &caps[2];
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();

        if name == "mc:Fallback" && !self_closing {
            if closing {
                fallback_depth = fallback_depth.saturating_sub(1);
            } else {
                fallback_depth += 1;
            }
            continue;
        }
        if fallback_depth > 0 {
            continue;
        }

        match (name, closing, self_closing) {
            ("w:p", false, false) => open.push(OpenParagraph::default()),
            ("w:p", false, true) => paragraphs.push(String::new()),
            ("w:p", true, _) => {
                if let Some(paragraph) = open.pop() {
                    paragraphs.push(paragraph.text);
                }
            }
            ("w:r", false, false) => {
                if let Some(paragraph) = open.last_mut() {
                    paragraph.runs += 1;
                }
            }
            ("w:r", true, _) => {
                if let Some(paragraph) = open.last_mut() {
                    paragraph.runs = paragraph.runs.saturating_sub(1);
                }
            }
            ("w:t", false, false) => in_text = true,
            ("w:t", true, _) => in_text = false,
            // <w:tab/> outside a run is a tab-stop definition, not content.
            ("w:tab", false, true) => push_in_run(&mut open, '\t'),
            ("w:br" | "w:cr", false, true) => push_in_run(&mut open, '\n'),
            _ => {}
        }
    }

    paragraphs
}

#[derive(Default)]
struct OpenParagraph {
    text: String,
    /// Runs of this paragraph currently open.
    runs: usize,
}

fn push_in_run(open: &mut [OpenParagraph], ch: char) {
    if let Some(paragraph) = open.last_mut().filter(|p| p.runs > 0) {
        paragraph.text.push(ch);
    }
}

/// Decodes the predefined XML entities and numeric character references.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..end];
        match decode_entity(entity) {
            Some(ch) => out.push(ch),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
