// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # pdfrag
//!
//! Retrieval-augmented question answering over a directory of PDF documents,
//! backed by a local Ollama server.
//!
//! ## Architecture
//!
//! - **Library** (`library`): PDF loading, recursive text splitting, stable chunk ids, ingestion
//! - **Store** (`store`): Embedded chunks persisted in redb, exhaustive cosine search
//! - **LLM** (`llm`): Ollama completions and embeddings behind small traits
//! - **Query** (`query`): Prompt rendering, reasoning/answer split, display
//! - **Interactive** (`interactive`): The read-answer loop used by the `pdfrag` binary
//!
//! ## Library usage
//!
//! ```no_run
//! use pdfrag::config::RagConfig;
//! use pdfrag::llm::{OllamaClient, OllamaEmbedder};
//! use pdfrag::query::{DisplayOptions, QueryEngine, render_response};
//!
//! let config = RagConfig::discover().unwrap();
//! pdfrag::library::populate(&config, &OllamaEmbedder::new(config.ollama.clone()), false).unwrap();
//!
//! let engine = QueryEngine::new(
//!     &config.store_dir,
//!     config.top_k,
//!     Box::new(OllamaEmbedder::new(config.ollama.clone())),
//!     Box::new(OllamaClient::new(config.ollama.clone())),
//! );
//! let response = engine.query("How much does a hotel cost?").unwrap();
//! print!("{}", render_response(&response, &DisplayOptions::one_shot()));
//! ```

pub mod config;
pub mod error;
pub mod interactive;
pub mod library;
pub mod llm;
pub mod query;
pub mod store;
