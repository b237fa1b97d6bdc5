//! Text embeddings via Ollama's `/api/embed` endpoint.

use serde::Deserialize;

use super::{LlmError, OllamaConfig};

/// Turns text into vectors for similarity search.
pub trait Embedder {
    /// Embed a batch of texts, one vector per input, in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors.pop().ok_or(LlmError::EmbeddingCount {
            sent: 1,
            received: 0,
        })
    }
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedder backed by an Ollama embedding model.
pub struct OllamaEmbedder {
    config: OllamaConfig,
    agent: ureq::Agent,
}

impl OllamaEmbedder {
    pub fn new(config: OllamaConfig) -> Self {
        let agent = config.agent();
        Self { config, agent }
    }
}

impl Embedder for OllamaEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.embed_model,
            "input": texts,
        });

        let resp = self
            .agent
            .post(&url)
            .send_json(body)
            .map_err(|e: ureq::Error| LlmError::RequestFailed {
                message: e.to_string(),
            })?;

        let parsed: EmbedResponse = resp.into_json().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(LlmError::EmbeddingCount {
                sent: texts.len(),
                received: parsed.embeddings.len(),
            });
        }
        Ok(parsed.embeddings)
    }
}

impl std::fmt::Debug for OllamaEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaEmbedder")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.embed_model)
            .finish()
    }
}
