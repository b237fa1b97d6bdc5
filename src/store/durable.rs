//! Identifier-keyed vector store backed by redb.
//!
//! One table maps chunk id to a bincode-encoded [`StoredChunk`]. Inserts
//! never overwrite: an id that is already present is skipped. Search is an
//! exhaustive cosine scan, which is plenty for a local document shelf.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::error::StoreError;
use crate::store::{ScoredChunk, StoreResult, StoredChunk, cosine_similarity};

/// Chunk id → bincode-encoded [`StoredChunk`].
const CHUNKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("chunks");

/// File name of the database inside the store directory.
pub const DB_FILE: &str = "pdfrag.redb";

fn redb_err<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::Redb {
        message: format!("{op} failed: {e}"),
    }
}

/// Persistent vector store in a single directory.
pub struct VectorStore {
    db: Database,
    dir: PathBuf,
}

impl VectorStore {
    /// Open or create a store in the given directory.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let db_path = dir.join(DB_FILE);
        let db = Database::create(&db_path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;

        // Make sure the table exists so read transactions never miss it.
        let txn = db.begin_write().map_err(redb_err("begin_write"))?;
        txn.open_table(CHUNKS_TABLE).map_err(redb_err("open_table"))?;
        txn.commit().map_err(redb_err("commit"))?;

        tracing::debug!(path = %db_path.display(), "opened vector store");
        Ok(Self {
            db,
            dir: dir.to_path_buf(),
        })
    }

    /// Number of stored entries.
    pub fn len(&self) -> StoreResult<usize> {
        let txn = self.db.begin_read().map_err(redb_err("begin_read"))?;
        let table = txn.open_table(CHUNKS_TABLE).map_err(redb_err("open_table"))?;
        let len = table.len().map_err(redb_err("len"))?;
        Ok(len as usize)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// All stored ids.
    pub fn ids(&self) -> StoreResult<HashSet<String>> {
        let txn = self.db.begin_read().map_err(redb_err("begin_read"))?;
        let table = txn.open_table(CHUNKS_TABLE).map_err(redb_err("open_table"))?;
        let mut ids = HashSet::new();
        for entry in table.iter().map_err(redb_err("iter"))? {
            let (key, _) = entry.map_err(redb_err("iter"))?;
            ids.insert(key.value().to_string());
        }
        Ok(ids)
    }

    /// Whether an entry with this id exists.
    pub fn contains(&self, id: &str) -> StoreResult<bool> {
        self.get(id).map(|v| v.is_some())
    }

    /// Read one entry by id.
    pub fn get(&self, id: &str) -> StoreResult<Option<StoredChunk>> {
        let txn = self.db.begin_read().map_err(redb_err("begin_read"))?;
        let table = txn.open_table(CHUNKS_TABLE).map_err(redb_err("open_table"))?;
        let guard = table.get(id).map_err(redb_err("get"))?;
        guard.map(|g| decode(id, g.value())).transpose()
    }

    /// Dimension of the stored vectors, or `None` for an empty store.
    pub fn dimension(&self) -> StoreResult<Option<usize>> {
        let txn = self.db.begin_read().map_err(redb_err("begin_read"))?;
        let table = txn.open_table(CHUNKS_TABLE).map_err(redb_err("open_table"))?;
        let first = table.first().map_err(redb_err("first"))?;
        match first {
            Some((key, value)) => {
                let entry = decode(key.value(), value.value())?;
                Ok(Some(entry.embedding.len()))
            }
            None => Ok(None),
        }
    }

    /// Insert entries whose id is not yet present, in one transaction.
    ///
    /// Existing entries are never touched. Returns how many were added.
    pub fn add_chunks(&self, entries: Vec<StoredChunk>) -> StoreResult<usize> {
        let mut expected = self.dimension()?;
        let txn = self.db.begin_write().map_err(redb_err("begin_write"))?;
        let mut added = 0usize;
        {
            let mut table = txn.open_table(CHUNKS_TABLE).map_err(redb_err("open_table"))?;
            for entry in entries {
                let dim = entry.embedding.len();
                match expected {
                    Some(want) if want != dim => {
                        return Err(StoreError::DimensionMismatch {
                            expected: want,
                            actual: dim,
                        });
                    }
                    Some(_) => {}
                    None => expected = Some(dim),
                }

                let present = table
                    .get(entry.id.as_str())
                    .map_err(redb_err("get"))?
                    .is_some();
                if present {
                    tracing::debug!(id = %entry.id, "already stored, skipping");
                    continue;
                }

                let bytes = encode(&entry)?;
                table
                    .insert(entry.id.as_str(), bytes.as_slice())
                    .map_err(redb_err("insert"))?;
                added += 1;
            }
        }
        txn.commit().map_err(redb_err("commit"))?;
        Ok(added)
    }

    /// The `k` entries most similar to `query`, best first.
    ///
    /// Returns fewer than `k` only when the store holds fewer entries.
    pub fn similarity_search(&self, query: &[f32], k: usize) -> StoreResult<Vec<ScoredChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let txn = self.db.begin_read().map_err(redb_err("begin_read"))?;
        let table = txn.open_table(CHUNKS_TABLE).map_err(redb_err("open_table"))?;

        let mut scored = Vec::new();
        for entry in table.iter().map_err(redb_err("iter"))? {
            let (key, value) = entry.map_err(redb_err("iter"))?;
            let chunk = decode(key.value(), value.value())?;
            if chunk.embedding.len() != query.len() {
                return Err(StoreError::DimensionMismatch {
                    expected: chunk.embedding.len(),
                    actual: query.len(),
                });
            }
            let score = cosine_similarity(query, &chunk.embedding);
            scored.push(ScoredChunk { chunk, score });
        }

        // Stable sort: equal scores keep key order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore").field("dir", &self.dir).finish()
    }
}

fn encode(entry: &StoredChunk) -> StoreResult<Vec<u8>> {
    bincode::serialize(entry).map_err(|e| StoreError::Serialization {
        id: entry.id.clone(),
        message: e.to_string(),
    })
}

fn decode(id: &str, bytes: &[u8]) -> StoreResult<StoredChunk> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
        id: id.to_string(),
        message: e.to_string(),
    })
}
