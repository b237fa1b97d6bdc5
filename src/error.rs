//! Rich diagnostic error types for pdfrag.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::llm::LlmError;

/// Top-level error type for pdfrag.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum RagError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on the terminal: {source}")]
    #[diagnostic(
        code(pdfrag::io),
        help("Reading the query or writing the answer failed. Check that stdin/stdout are usable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for crate-level results.
pub type RagResult<T> = std::result::Result<T, RagError>;

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(pdfrag::store::io),
        help(
            "A filesystem operation on the vector store failed. Check that the \
             store directory is writable and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(pdfrag::store::redb),
        help(
            "The embedded database encountered an error. It may be corrupt or \
             held open by another pdfrag process. Re-run `pdfrag-populate --reset` \
             to rebuild it."
        )
    )]
    Redb { message: String },

    #[error("serialization error for entry \"{id}\": {message}")]
    #[diagnostic(
        code(pdfrag::store::serde),
        help(
            "A stored entry could not be encoded or decoded. The on-disk format \
             probably changed between versions; rebuild with `pdfrag-populate --reset`."
        )
    )]
    Serialization { id: String, message: String },

    #[error("embedding dimension mismatch: store holds {expected}-d vectors, got {actual}")]
    #[diagnostic(
        code(pdfrag::store::dim_mismatch),
        help(
            "The embedding model changed since the store was built. Re-run \
             `pdfrag-populate --reset` with the current model."
        )
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Loader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoaderError {
    #[error("input directory not readable: {path}")]
    #[diagnostic(
        code(pdfrag::loader::dir),
        help("Create the directory and put the PDF files to index inside it, or set `data_dir` in pdfrag.toml.")
    )]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    #[diagnostic(
        code(pdfrag::loader::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from {path}: {message}")]
    #[diagnostic(
        code(pdfrag::loader::pdf),
        help(
            "The PDF could not be parsed. Verify the file is a valid, unencrypted \
             PDF, or remove it from the input directory."
        )
    )]
    Pdf { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(pdfrag::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(pdfrag::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(pdfrag::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid chunking parameters: overlap {overlap} must be smaller than chunk size {size}")]
    #[diagnostic(
        code(pdfrag::config::chunking),
        help("Lower `chunking.chunk_overlap` or raise `chunking.chunk_size`.")
    )]
    Chunking { size: usize, overlap: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn transparent_wrapping_keeps_code() {
        let err: RagError = StoreError::DimensionMismatch {
            expected: 768,
            actual: 384,
        }
        .into();
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("pdfrag::store::dim_mismatch"));
        assert!(err.to_string().contains("768"));
    }
}
