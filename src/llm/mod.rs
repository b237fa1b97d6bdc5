//! Ollama client for completions and embeddings.
//!
//! Both the language model and the embedding model are reached over the
//! Ollama REST API with blocking `ureq` calls. The pipelines only see the
//! [`LanguageModel`] and [`Embedder`] traits, so tests can substitute
//! deterministic fakes.

pub mod embed;

use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use embed::{Embedder, OllamaEmbedder};

/// Errors from the LLM subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("Ollama is not available at {url}")]
    #[diagnostic(
        code(pdfrag::llm::unavailable),
        help("Start Ollama with `ollama serve`, or point `ollama.base_url` in pdfrag.toml at a running server.")
    )]
    Unavailable { url: String },

    #[error("Ollama request failed: {message}")]
    #[diagnostic(
        code(pdfrag::llm::request_failed),
        help("Check that Ollama is running and the model is pulled (`ollama pull <model>`).")
    )]
    RequestFailed { message: String },

    #[error("Failed to parse Ollama response: {message}")]
    #[diagnostic(
        code(pdfrag::llm::parse_error),
        help("The server returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("embedding count mismatch: sent {sent} texts, received {received} vectors")]
    #[diagnostic(
        code(pdfrag::llm::embed_count),
        help("The embedding model dropped inputs. Try a different `ollama.embed_model`.")
    )]
    EmbeddingCount { sent: usize, received: usize },
}

/// Configuration for the Ollama client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used to answer queries.
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used to embed chunks and queries.
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    /// Request timeout in seconds. Unset means calls block until the server answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.2".into()
}
fn default_embed_model() -> String {
    "nomic-embed-text".into()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            embed_model: default_embed_model(),
            timeout_secs: None,
        }
    }
}

impl OllamaConfig {
    pub(crate) fn agent(&self) -> ureq::Agent {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}

/// A model that turns a rendered prompt into a single completion.
pub trait LanguageModel {
    /// Generate a completion for `prompt`. Blocks until the model answers.
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model name, for logs.
    fn name(&self) -> &str;
}

/// Client for the Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    config: OllamaConfig,
    agent: ureq::Agent,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: OllamaConfig) -> Self {
        let agent = config.agent();
        Self { config, agent }
    }

    /// Probe the server and return the names of locally available models.
    ///
    /// Uses a short fixed timeout regardless of `timeout_secs`.
    pub fn probe(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(5))
            .build();

        let resp = agent.get(&url).call().map_err(|_| LlmError::Unavailable {
            url: self.config.base_url.clone(),
        })?;
        let json: serde_json::Value = resp.into_json().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        Ok(json["models"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m["name"].as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Log a warning if the server is down or a configured model is not pulled.
    ///
    /// Never fails: the real request will surface the error if it matters.
    pub fn check_models(&self, wanted: &[&str]) {
        match self.probe() {
            Ok(models) => {
                for name in wanted {
                    if !has_model(&models, name) {
                        tracing::warn!(model = name, "model not pulled; run `ollama pull {name}`");
                    }
                }
            }
            Err(e) => tracing::warn!("{e}"),
        }
    }
}

impl LanguageModel for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });

        tracing::debug!(model = %self.config.model, chars = prompt.len(), "generating");
        let resp = self
            .agent
            .post(&url)
            .send_json(body)
            .map_err(|e: ureq::Error| LlmError::RequestFailed {
                message: e.to_string(),
            })?;

        let json: serde_json::Value = resp.into_json().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::ParseError {
                message: "missing 'response' field".into(),
            })
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

/// Whether `target` is among `models`, ignoring an implicit `:latest` tag.
pub fn has_model(models: &[String], target: &str) -> bool {
    models
        .iter()
        .any(|m| m == target || m.split(':').next() == Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> OllamaConfig {
        OllamaConfig {
            base_url: "http://127.0.0.1:1".into(), // unreachable port
            ..Default::default()
        }
    }

    #[test]
    fn probe_unreachable_is_unavailable() {
        let client = OllamaClient::new(unreachable());
        assert!(matches!(client.probe(), Err(LlmError::Unavailable { .. })));
    }

    #[test]
    fn generate_unreachable_is_request_failed() {
        let client = OllamaClient::new(unreachable());
        let result = client.generate("test");
        assert!(matches!(result, Err(LlmError::RequestFailed { .. })));
    }

    #[test]
    fn has_model_ignores_tag() {
        let models = vec!["llama3.2:latest".to_string(), "nomic-embed-text:v1.5".to_string()];
        assert!(has_model(&models, "llama3.2"));
        assert!(has_model(&models, "llama3.2:latest"));
        assert!(has_model(&models, "nomic-embed-text"));
        assert!(!has_model(&models, "mistral"));
    }

    #[test]
    fn default_config_values() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.embed_model, "nomic-embed-text");
        assert_eq!(config.timeout_secs, None);
    }
}
