//! Directory loading and the per-format parser trait.
//!
//! Every file in the input directory whose extension matches the parser is
//! read and split into pages, producing one [`Document`] per page.

pub mod pdf;

use std::path::{Path, PathBuf};

use crate::error::LoaderError;
use crate::library::model::Document;

pub type LoaderResult<T> = std::result::Result<T, LoaderError>;

/// Trait for format-specific page extractors.
pub trait ContentParser {
    /// Lowercase file extension this parser handles, without the dot.
    fn extension(&self) -> &'static str;

    /// Extract page texts, in page order, from raw file bytes.
    fn parse(&self, origin: &str, data: &[u8]) -> LoaderResult<Vec<String>>;
}

/// Load every PDF directly inside `dir`.
pub fn load_directory(dir: &Path) -> LoaderResult<Vec<Document>> {
    load_directory_with(dir, &pdf::PdfParser)
}

/// Load every file in `dir` that `parser` handles, one [`Document`] per page.
///
/// Files are visited in file-name order so chunk ids come out the same on
/// every run. Hidden files and subdirectories are skipped.
pub fn load_directory_with(dir: &Path, parser: &dyn ContentParser) -> LoaderResult<Vec<Document>> {
    let files = list_files(dir, parser.extension())?;
    let mut documents = Vec::new();

    for path in files {
        let origin = path.display().to_string();
        let data = std::fs::read(&path).map_err(|e| LoaderError::Read {
            path: origin.clone(),
            source: e,
        })?;
        let pages = parser.parse(&origin, &data)?;
        tracing::debug!(file = %origin, pages = pages.len(), "loaded");

        documents.extend(
            pages
                .into_iter()
                .enumerate()
                .map(|(page, text)| Document::new(origin.clone(), page as u32, text)),
        );
    }

    tracing::info!(dir = %dir.display(), pages = documents.len(), "documents loaded");
    Ok(documents)
}

/// List matching files directly inside `dir`, sorted by name.
fn list_files(dir: &Path, extension: &str) -> LoaderResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoaderError::Directory {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| !name.starts_with('.'))
        })
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    files.sort();
    Ok(files)
}
