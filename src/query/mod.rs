//! Query/answer pipeline.
//!
//! Retrieve the nearest chunks, render the fixed prompt around them, ask the
//! model, and split its completion into answer and reasoning. Display is kept
//! separate in [`display`].

pub mod answer;
pub mod display;
pub mod prompt;

use std::path::PathBuf;

use crate::error::RagResult;
use crate::llm::{Embedder, LanguageModel};
use crate::store::{ScoredChunk, VectorStore};

pub use answer::{ParsedCompletion, parse_completion};
pub use display::{DisplayOptions, render_response};

/// Provenance of one retrieved chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRef {
    /// Chunk id, `"{source}:{page}:{index}"`.
    pub id: String,
    /// Cosine similarity to the question.
    pub score: f32,
}

/// Everything produced for one question.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Final answer with any reasoning block and `Response:` label removed.
    pub answer: String,
    pub reasoning: Option<String>,
    /// One entry per retrieved chunk, best match first.
    pub sources: Vec<SourceRef>,
    /// The exact prompt sent to the model.
    pub prompt: String,
}

/// Answers questions against a store directory with one embedder and one
/// model, both reused for every query.
pub struct QueryEngine {
    store_dir: PathBuf,
    top_k: usize,
    embedder: Box<dyn Embedder>,
    model: Box<dyn LanguageModel>,
}

impl QueryEngine {
    pub fn new(
        store_dir: impl Into<PathBuf>,
        top_k: usize,
        embedder: Box<dyn Embedder>,
        model: Box<dyn LanguageModel>,
    ) -> Self {
        Self {
            store_dir: store_dir.into(),
            top_k,
            embedder,
            model,
        }
    }

    /// The `top_k` chunks nearest to `question`.
    ///
    /// The store is opened fresh on every call, so chunks added by the
    /// indexer between queries are visible.
    pub fn retrieve(&self, question: &str) -> RagResult<Vec<ScoredChunk>> {
        let store = VectorStore::open(&self.store_dir)?;
        let query_vector = self.embedder.embed(question)?;
        let results = store.similarity_search(&query_vector, self.top_k)?;
        tracing::info!(retrieved = results.len(), k = self.top_k, "data retrieved");
        Ok(results)
    }

    /// Answer one question. Blocks until the model responds.
    pub fn query(&self, question: &str) -> RagResult<QueryResponse> {
        let results = self.retrieve(question)?;

        let context = prompt::build_context(results.iter().map(|r| r.chunk.text.as_str()));
        let rendered = prompt::render_prompt(&context, question);

        tracing::debug!(model = self.model.name(), "invoking model");
        let raw = self.model.generate(&rendered)?;
        let parsed = parse_completion(&raw);

        let sources = results
            .into_iter()
            .map(|r| SourceRef {
                id: r.chunk.id,
                score: r.score,
            })
            .collect();

        Ok(QueryResponse {
            answer: parsed.answer,
            reasoning: parsed.reasoning,
            sources,
            prompt: rendered,
        })
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("store_dir", &self.store_dir)
            .field("top_k", &self.top_k)
            .field("model", &self.model.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::llm::LlmError;
    use crate::store::StoredChunk;

    /// One axis per keyword.
    struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        t.matches("hotel").count() as f32,
                        t.matches("jail").count() as f32,
                        t.matches("dice").count() as f32,
                    ]
                })
                .collect())
        }
    }

    /// Records prompts and replies with a fixed completion.
    struct ScriptedModel {
        reply: String,
        prompts: Rc<RefCell<Vec<String>>>,
    }

    impl LanguageModel for ScriptedModel {
        fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn seed(store_dir: &std::path::Path) {
        let store = VectorStore::open(store_dir).unwrap();
        let texts = [
            ("rules.pdf:0:0", "A hotel replaces four houses."),
            ("rules.pdf:0:1", "Go directly to jail."),
            ("rules.pdf:1:0", "Roll the dice to move."),
        ];
        let embeddings = KeywordEmbedder
            .embed_batch(&texts.iter().map(|(_, t)| t.to_string()).collect::<Vec<_>>())
            .unwrap();
        let entries = texts
            .iter()
            .zip(embeddings)
            .map(|((id, text), embedding)| StoredChunk {
                id: id.to_string(),
                source: "rules.pdf".into(),
                page: 0,
                index: 0,
                text: text.to_string(),
                embedding,
            })
            .collect();
        store.add_chunks(entries).unwrap();
    }

    fn engine(store_dir: &std::path::Path, k: usize, reply: &str) -> (QueryEngine, Rc<RefCell<Vec<String>>>) {
        let prompts = Rc::new(RefCell::new(Vec::new()));
        let model = ScriptedModel {
            reply: reply.into(),
            prompts: Rc::clone(&prompts),
        };
        let engine = QueryEngine::new(store_dir, k, Box::new(KeywordEmbedder), Box::new(model));
        (engine, prompts)
    }

    #[test]
    fn best_match_first_in_context_and_sources() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(dir.path());
        let (engine, prompts) = engine(dir.path(), 1, "Four houses.");

        let response = engine.query("What does a hotel cost?").unwrap();
        assert_eq!(response.answer, "Four houses.");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].id, "rules.pdf:0:0");

        let sent = prompts.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("A hotel replaces four houses."));
        assert!(!sent[0].contains("jail"));
        assert!(sent[0].ends_with("context: What does a hotel cost?\n"));
        assert_eq!(response.prompt, sent[0]);
    }

    #[test]
    fn context_uses_separator_between_chunks() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(dir.path());
        let (engine, _) = engine(dir.path(), 3, "ok");

        let response = engine.query("jail").unwrap();
        assert_eq!(response.sources.len(), 3);
        assert_eq!(response.sources[0].id, "rules.pdf:0:1");
        // Ties keep key order behind the best match.
        assert!(response.prompt.contains(
            "Go directly to jail.\n\n---\n\nA hotel replaces four houses.\n\n---\n\nRoll the dice to move."
        ));
    }

    #[test]
    fn reasoning_split_from_answer() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(dir.path());
        let (engine, _) = engine(dir.path(), 3, "<think>look at dice</think>\nResponse: Roll.");

        let response = engine.query("dice").unwrap();
        assert_eq!(response.answer, "Roll.");
        assert_eq!(response.reasoning.as_deref(), Some("look at dice"));
    }

    #[test]
    fn empty_store_still_asks_model() {
        let dir = tempfile::TempDir::new().unwrap();
        let (engine, prompts) = engine(&dir.path().join("fresh"), 3, "No idea.");

        let response = engine.query("anything").unwrap();
        assert!(response.sources.is_empty());
        assert_eq!(response.answer, "No idea.");
        assert_eq!(prompts.borrow().len(), 1);
    }
}
