//! Core data types for the document library.
//!
//! A PDF is loaded as one [`Document`] per page. The splitter turns each page
//! into page-local text pieces, and id assignment turns those into
//! [`Chunk`]s keyed by `"{source}:{page}:{index}"`.

use serde::{Deserialize, Serialize};

/// Text of one page of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path of the source file, as joined from the data directory.
    pub source: String,
    /// Zero-based page number.
    pub page: u32,
    /// Raw page text.
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page,
            text: text.into(),
        }
    }

    /// `"{source}:{page}"`, the grouping key for chunk ordinals.
    pub fn page_id(&self) -> String {
        format!("{}:{}", self.source, self.page)
    }
}

/// A contiguous slice of a page's text with its ordinal within that page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub source: String,
    pub page: u32,
    /// Zero-based position among the chunks of the same page.
    pub index: usize,
    pub text: String,
}

impl Chunk {
    /// The store key: `"{source}:{page}:{index}"`.
    pub fn id(&self) -> String {
        format!("{}:{}:{}", self.source, self.page, self.index)
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.page, self.index)
    }
}
