//! Retrieval-augmented question answering.
//!
//! [`QaEngine`] embeds a question, retrieves the most similar chunks from
//! the shared collection, assembles a grounded prompt with the session's
//! conversation history, and generates an answer at a fixed low
//! temperature. The chunks that grounded the answer come back as citations.

use std::sync::Arc;

use tracing::{error, info};

use hrkb_rag::{EmbeddingProvider, SearchResult, VectorStore};

use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::llm::{ChatMessage, ChatModel};
use crate::pii::{NameHeuristicDetector, PiiDetector};
use crate::session::{SessionStore, Turn};

/// A generated answer with its citations.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// The top retrieved chunks, for citation display. At most
    /// `cited_sources` of the `top_k` chunks that grounded the answer.
    pub sources: Vec<SearchResult>,
    /// Whether the question appeared to contain personal information.
    /// Advisory only; the question was answered regardless.
    pub pii_notice: bool,
}

/// The question-answering engine.
///
/// Construct one via [`QaEngine::builder()`]. Shares the vector store
/// collection with the ingestion path; reads only.
pub struct QaEngine {
    config: ChatConfig,
    collection: String,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    model: Arc<dyn ChatModel>,
    pii: Arc<dyn PiiDetector>,
    sessions: SessionStore,
}

impl QaEngine {
    /// Create a new [`QaEngineBuilder`].
    pub fn builder() -> QaEngineBuilder {
        QaEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Number of retained turns for a session. For observability and tests.
    pub async fn history_len(&self, session_id: &str) -> usize {
        self.sessions.turn_count(session_id).await
    }

    /// Answer a question within a session.
    ///
    /// Flow: PII pre-check (annotates, never blocks) → embed the question →
    /// retrieve the `top_k` most similar chunks → prompt the model with the
    /// retrieved context, the session's history, and the question → append
    /// the turn to history. History grows only on success; a generation
    /// failure leaves it untouched.
    ///
    /// One question per session may be in flight at a time. A second
    /// concurrent call for the same session is rejected with
    /// [`ChatError::SessionBusy`] rather than queued.
    pub async fn ask(&self, question: &str, session_id: &str) -> Result<Answer> {
        let pii_notice = self.pii.detect(question);

        let session = self.sessions.session(session_id).await;
        let mut history = session
            .try_lock()
            .map_err(|_| ChatError::SessionBusy { session_id: session_id.to_string() })?;

        let query_embedding = self.embedder.embed(question).await.inspect_err(|e| {
            error!(session_id, error = %e, "question embedding failed");
        })?;

        let retrieved = self
            .store
            .search(&self.collection, &query_embedding, self.config.top_k)
            .await
            .inspect_err(|e| {
                error!(session_id, collection = %self.collection, error = %e, "retrieval failed");
            })?;

        let messages = self.assemble_prompt(question, &retrieved, history.turns());

        let answer = self
            .model
            .generate(&messages, self.config.temperature)
            .await
            .inspect_err(|e| {
                error!(session_id, model = self.model.name(), error = %e, "generation failed");
            })?;

        if answer.trim().is_empty() {
            return Err(ChatError::Generation {
                provider: self.model.name().to_string(),
                message: "model returned empty content".to_string(),
            });
        }

        history.push(Turn { question: question.to_string(), answer: answer.clone() });
        drop(history);

        let mut sources = retrieved;
        sources.truncate(self.config.cited_sources);

        info!(
            session_id,
            cited = sources.len(),
            pii_notice,
            "answered question"
        );

        Ok(Answer { text: answer, sources, pii_notice })
    }

    /// Build the grounded prompt: system instruction with retrieved context
    /// in similarity order, then the session history, then the question.
    fn assemble_prompt(
        &self,
        question: &str,
        retrieved: &[SearchResult],
        turns: &[Turn],
    ) -> Vec<ChatMessage> {
        let context = retrieved
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut messages =
            Vec::with_capacity(2 * turns.len() + 2);
        messages.push(ChatMessage::system(format!(
            "{}\n\nContext:\n{context}",
            self.config.system_prompt
        )));
        for turn in turns {
            messages.push(ChatMessage::user(&turn.question));
            messages.push(ChatMessage::assistant(&turn.answer));
        }
        messages.push(ChatMessage::user(question));
        messages
    }
}

/// Builder for constructing a [`QaEngine`].
///
/// `collection`, `embedder`, `store`, and `model` are required. The PII
/// detector defaults to the capitalized-name heuristic.
#[derive(Default)]
pub struct QaEngineBuilder {
    config: Option<ChatConfig>,
    collection: Option<String>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    model: Option<Arc<dyn ChatModel>>,
    pii: Option<Arc<dyn PiiDetector>>,
}

impl QaEngineBuilder {
    /// Set the engine configuration.
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the vector store collection to retrieve from.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Set the embedding provider. Must match the one used at ingestion.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the chat model.
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set a custom PII detector.
    pub fn pii_detector(mut self, detector: Arc<dyn PiiDetector>) -> Self {
        self.pii = Some(detector);
        self
    }

    /// Build the [`QaEngine`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if a required field is missing.
    pub fn build(self) -> Result<QaEngine> {
        let config = self.config.unwrap_or_default();
        let collection = self
            .collection
            .ok_or_else(|| ChatError::Config("collection is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| ChatError::Config("embedder is required".to_string()))?;
        let store = self.store.ok_or_else(|| ChatError::Config("store is required".to_string()))?;
        let model = self.model.ok_or_else(|| ChatError::Config("model is required".to_string()))?;
        let pii = self.pii.unwrap_or_else(|| Arc::new(NameHeuristicDetector::new()));
        let sessions = SessionStore::new(config.max_turns);

        Ok(QaEngine { config, collection, embedder, store, model, pii, sessions })
    }
}
