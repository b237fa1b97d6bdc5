//! Document ingestion pipeline.
//!
//! Orchestrates: load pages → split → assign ids → drop ids already stored →
//! embed the rest → insert.

use std::path::Path;

use crate::config::RagConfig;
use crate::error::RagResult;
use crate::library::chunker::{ChunkConfig, RecursiveSplitter};
use crate::library::ids::assign_chunk_ids;
use crate::library::model::{Chunk, Document};
use crate::library::parser;
use crate::llm::{Embedder, LlmError};
use crate::store::{StoredChunk, VectorStore, reset_store};

/// Texts sent to the embedding model per request.
const EMBED_BATCH: usize = 32;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Pages loaded from the input.
    pub pages: usize,
    /// Chunks produced by the splitter.
    pub chunks: usize,
    /// Entries in the store before this run.
    pub existing: usize,
    /// Chunks skipped because their id was already stored.
    pub skipped: usize,
    /// Chunks newly inserted.
    pub added: usize,
}

/// Full indexer run: optional reset, load the data directory, ingest.
pub fn populate(config: &RagConfig, embedder: &dyn Embedder, reset: bool) -> RagResult<IngestReport> {
    if reset {
        reset_store(&config.store_dir)?;
    }
    let documents = parser::load_directory(&config.data_dir)?;
    ingest_into(&config.store_dir, embedder, &documents, &config.chunking)
}

/// Open the store at `store_dir` and ingest `documents` into it.
pub fn ingest_into(
    store_dir: &Path,
    embedder: &dyn Embedder,
    documents: &[Document],
    chunking: &ChunkConfig,
) -> RagResult<IngestReport> {
    let store = VectorStore::open(store_dir)?;
    ingest_documents(&store, embedder, documents, chunking)
}

/// Split, identify, and insert whatever the store does not hold yet.
///
/// Only new chunks are embedded. Entries already present are never touched.
pub fn ingest_documents(
    store: &VectorStore,
    embedder: &dyn Embedder,
    documents: &[Document],
    chunking: &ChunkConfig,
) -> RagResult<IngestReport> {
    let splitter = RecursiveSplitter::new(chunking.clone());
    let chunks = assign_chunk_ids(splitter.split_documents(documents));

    let existing_ids = store.ids()?;
    let total = chunks.len();
    let new_chunks: Vec<Chunk> = chunks
        .into_iter()
        .filter(|c| !existing_ids.contains(&c.id()))
        .collect();

    let mut report = IngestReport {
        pages: documents.len(),
        chunks: total,
        existing: existing_ids.len(),
        skipped: total - new_chunks.len(),
        added: 0,
    };
    tracing::info!(existing = report.existing, new = new_chunks.len(), "compared with store");

    if new_chunks.is_empty() {
        return Ok(report);
    }

    let entries = embed_chunks(embedder, new_chunks)?;
    report.added = store.add_chunks(entries)?;
    tracing::info!(added = report.added, "store updated");
    Ok(report)
}

fn embed_chunks(embedder: &dyn Embedder, chunks: Vec<Chunk>) -> RagResult<Vec<StoredChunk>> {
    let mut entries = Vec::with_capacity(chunks.len());
    let mut pending = chunks.into_iter().peekable();

    while pending.peek().is_some() {
        let batch: Vec<Chunk> = pending.by_ref().take(EMBED_BATCH).collect();
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(LlmError::EmbeddingCount {
                sent: texts.len(),
                received: vectors.len(),
            }
            .into());
        }
        tracing::debug!(batch = batch.len(), "embedded");
        entries.extend(
            batch
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| StoredChunk::new(chunk, vector)),
        );
    }
    Ok(entries)
}
