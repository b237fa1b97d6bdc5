//! Recursive character splitting with overlap.
//!
//! Text is cut on the coarsest separator present (paragraph break, then line
//! break, then space, then between characters). Pieces that are still too
//! long are split again with the finer separators; short pieces are merged
//! back together up to `chunk_size` characters, carrying up to
//! `chunk_overlap` characters from the end of one chunk into the next.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::library::model::Document;

/// Separators tried in order, coarsest first. The empty separator splits
/// between characters and always applies.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Configuration for chunk splitting. Lengths are in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum characters per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters carried over between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    800
}
fn default_chunk_overlap() -> usize {
    80
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Splits page text into overlapping chunks of bounded size.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    config: ChunkConfig,
}

impl RecursiveSplitter {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Split every document, keeping each piece's source and page.
    ///
    /// Output preserves input order, and pieces of one page stay contiguous.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let pieces: Vec<Document> = documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.text)
                    .into_iter()
                    .map(|text| Document::new(doc.source.clone(), doc.page, text))
            })
            .collect();
        tracing::info!(
            pages = documents.len(),
            chunks = pieces.len(),
            chunk_size = self.config.chunk_size,
            "split documents"
        );
        pieces
    }

    /// Split one text into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &DEFAULT_SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or("");
        let mut finer: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }
        chunks
    }

    /// Merge short pieces into chunks of at most `chunk_size` characters.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut merged = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > size {
                if total > size {
                    tracing::warn!(total, size, "created a chunk longer than the configured size");
                }
                if !window.is_empty() {
                    if let Some(chunk) = join_window(&window) {
                        merged.push(chunk);
                    }
                    // Drop from the front until only the overlap remains and
                    // the next piece fits.
                    while total > overlap || (total + len > size && total > 0) {
                        match window.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join_window(&window) {
            merged.push(chunk);
        }
        merged
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

/// Split on `separator`, attaching each separator to the start of the piece
/// that follows it. Empty pieces are dropped. An empty separator yields
/// single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
