use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A word token together with the whitespace that follows it.
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+\s*").expect("static word regex"));

/// A contiguous window of the document's words.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
}

/// Splits text into overlapping word windows, preserving the original whitespace
/// inside each window. Blank text produces no chunks.
///
/// `overlap` must be smaller than `size`; callers validate this at config load.
pub fn split_into_chunks(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    let size = size.max(1);
    let step = size.saturating_sub(overlap).max(1);
    let words: Vec<&str> = WORD.find_iter(text).map(|m| m.as_str()).collect();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + size).min(words.len());
        chunks.push(Chunk {
            id: chunks.len(),
            text: words[start..end].concat().trim_end().to_string(),
        });
        if end == words.len() {
            break;
        }
        start += step;
    }
    chunks
}
