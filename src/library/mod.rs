//! Document library: loading PDFs, splitting pages into chunks, assigning
//! stable chunk ids, and feeding new chunks into the vector store.

pub mod chunker;
pub mod ids;
pub mod ingest;
pub mod model;
pub mod parser;

pub use chunker::{ChunkConfig, RecursiveSplitter};
pub use ids::assign_chunk_ids;
pub use ingest::{IngestReport, ingest_documents, ingest_into, populate};
pub use model::{Chunk, Document};
