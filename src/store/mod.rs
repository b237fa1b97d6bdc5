//! Persistent vector store shared by the indexer and the query engine.
//!
//! - [`VectorStore`]: identifier-keyed entries in a redb database
//! - [`reset_store`]: destructive removal of the whole store directory
//!
//! The store is single-writer, single-reader. Running the indexer while a
//! query is in flight against the same directory is not supported.

pub mod durable;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::library::model::Chunk;

pub use durable::VectorStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One persisted entry: chunk text, provenance and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    /// `"{source}:{page}:{index}"`, also the table key.
    pub id: String,
    pub source: String,
    pub page: u32,
    pub index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl StoredChunk {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id(),
            source: chunk.source,
            page: chunk.page,
            index: chunk.index,
            text: chunk.text,
            embedding,
        }
    }
}

/// A search hit. Higher score means more similar.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: StoredChunk,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

/// Delete the store directory and everything in it.
///
/// Returns whether anything was removed.
pub fn reset_store(dir: &Path) -> StoreResult<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(dir).map_err(|e| StoreError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    tracing::info!(dir = %dir.display(), "vector store cleared");
    Ok(true)
}

/// Cosine similarity; zero when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
