//! Runtime configuration, persisted as TOML.
//!
//! Every field has a default, so a missing or partial `pdfrag.toml` is fine.
//! The resolved [`RagConfig`] is handed to each component at construction;
//! nothing reads paths or model names from globals.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::library::chunker::ChunkConfig;
use crate::llm::OllamaConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PDFRAG_CONFIG";

/// Config file looked up in the working directory when `PDFRAG_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "pdfrag.toml";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration shared by the indexer and the query engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Directory scanned for `*.pdf` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory holding the vector store.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Number of chunks retrieved per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub chunking: ChunkConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("store")
}
fn default_top_k() -> usize {
    5
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_dir: default_store_dir(),
            top_k: default_top_k(),
            chunking: ChunkConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl RagConfig {
    /// Resolve the configuration for this process.
    ///
    /// `$PDFRAG_CONFIG` wins if set; otherwise `./pdfrag.toml` is used when it
    /// exists; otherwise all defaults apply.
    pub fn discover() -> ConfigResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            Self::load(local)
        } else {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "(inline)".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ConfigError::Chunking {
                size: self.chunking.chunk_size,
                overlap: self.chunking.chunk_overlap,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_layout() {
        let config = RagConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.store_dir, PathBuf::from("store"));
        assert_eq!(config.top_k, 5);
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.chunking.chunk_overlap, 80);
        assert_eq!(config.ollama.model, "llama3.2");
        assert_eq!(config.ollama.timeout_secs, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RagConfig::from_toml(
            r#"
            top_k = 3

            [ollama]
            model = "deepseek-r1"
            "#,
        )
        .unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.ollama.model, "deepseek-r1");
        assert_eq!(config.ollama.embed_model, "nomic-embed-text");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.chunking.chunk_size, 800);
    }

    #[test]
    fn overlap_not_below_size_rejected() {
        let err = RagConfig::from_toml(
            r#"
            [chunking]
            chunk_size = 100
            chunk_overlap = 100
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Chunking { size: 100, overlap: 100 }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = RagConfig::from_toml("top_k = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("pdfrag.toml");

        let mut config = RagConfig::default();
        config.top_k = 7;
        config.store_dir = PathBuf::from("/tmp/vectors");
        config.ollama.timeout_secs = Some(30);
        config.save(&path).unwrap();

        let loaded = RagConfig::load(&path).unwrap();
        assert_eq!(loaded.top_k, 7);
        assert_eq!(loaded.store_dir, PathBuf::from("/tmp/vectors"));
        assert_eq!(loaded.ollama.timeout_secs, Some(30));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = RagConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
