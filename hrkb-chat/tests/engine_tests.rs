//! Integration tests for the question-answering engine.

use std::sync::Arc;

use async_trait::async_trait;
use hrkb_chat::{ChatConfig, ChatError, ChatMessage, ChatModel, MockChatModel, QaEngine, Role};
use hrkb_rag::document::{LoadedDocument, Segment, SourceKind};
use hrkb_rag::embedding::EmbeddingProvider;
use hrkb_rag::metadata::TagOptions;
use hrkb_rag::{DocumentCatalog, IngestionPipeline, InMemoryVectorStore, RagConfig, VectorStore};

const DIM: usize = 8;
const COLLECTION: &str = "hr_knowledge";

/// Deterministic embedder: buckets byte values into a fixed-size vector.
struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> hrkb_rag::Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIM];
        for (i, b) in text.bytes().enumerate() {
            v[i % DIM] += b as f32;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// A model that blocks inside generate() until released, to hold a session
/// guard across another call.
struct BlockingModel {
    started: Arc<tokio::sync::Notify>,
    release: Arc<tokio::sync::Notify>,
}

#[async_trait]
impl ChatModel for BlockingModel {
    fn name(&self) -> &str {
        "blocking"
    }

    async fn generate(&self, _messages: &[ChatMessage], _temperature: f32) -> hrkb_chat::Result<String> {
        self.started.notify_one();
        self.release.notified().await;
        Ok("done".to_string())
    }
}

/// Ingest a five-chunk policy document and return the shared store.
async fn seeded_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = IngestionPipeline::builder()
        .config(RagConfig::default())
        .embedder(Arc::new(StubEmbedder))
        .store(store.clone())
        .build()
        .unwrap();
    let catalog = DocumentCatalog::new(Arc::new(pipeline));

    let doc = LoadedDocument {
        segments: (1..=5)
            .map(|i| Segment {
                text: format!("policy clause {i}: remote work requires manager approval"),
                page: Some(i),
            })
            .collect(),
    };
    let count = catalog
        .ingest_document(&doc, "policy.pdf", SourceKind::Policy, &TagOptions::default())
        .await
        .unwrap();
    assert_eq!(count, 5);
    store
}

fn engine_with(store: Arc<dyn VectorStore>, model: Arc<dyn ChatModel>) -> QaEngine {
    QaEngine::builder()
        .config(ChatConfig::default())
        .collection(COLLECTION)
        .embedder(Arc::new(StubEmbedder))
        .store(store)
        .model(model)
        .build()
        .unwrap()
}

#[tokio::test]
async fn ask_returns_answer_with_cited_sources() {
    let store = seeded_store().await;
    let model = Arc::new(MockChatModel::with_replies(["Remote work needs manager approval."]));
    let engine = engine_with(store, model);

    let answer = engine.ask("what does the policy say about remote work?", "s1").await.unwrap();

    assert_eq!(answer.text, "Remote work needs manager approval.");
    // 5 chunks ground the answer, at most 3 are cited.
    assert_eq!(answer.sources.len(), 3);
    for cited in &answer.sources {
        assert_eq!(cited.chunk.metadata.source, "policy.pdf");
    }
    assert!(!answer.pii_notice);
    assert_eq!(engine.history_len("s1").await, 1);
}

#[tokio::test]
async fn prompt_grounds_the_model_in_retrieved_context() {
    let store = seeded_store().await;
    let model = Arc::new(MockChatModel::with_replies(["ok"]));
    let engine = engine_with(store, model.clone());

    engine.ask("remote work?", "s1").await.unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    let system = &prompts[0][0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.contains("Context:"));
    assert!(system.content.contains("policy clause"));
    // The question is the final user message.
    let last = prompts[0].last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, "remote work?");
}

#[tokio::test]
async fn ranking_is_stable_across_repeated_asks() {
    let store = seeded_store().await;
    let model = Arc::new(MockChatModel::with_replies(["a", "b", "c"]));
    let engine = engine_with(store, model);

    let mut orders = Vec::new();
    for i in 0..3 {
        let answer = engine.ask("what about approval?", &format!("s{i}")).await.unwrap();
        let ids: Vec<String> = answer.sources.iter().map(|r| r.chunk.id.clone()).collect();
        orders.push(ids);
    }
    assert_eq!(orders[0], orders[1]);
    assert_eq!(orders[1], orders[2]);
}

#[tokio::test]
async fn generation_failure_leaves_history_unchanged() {
    let store = seeded_store().await;
    // No scripted replies: every generate() call fails.
    let engine = engine_with(store, Arc::new(MockChatModel::new()));

    let err = engine.ask("anything", "s1").await.unwrap_err();
    assert!(matches!(err, ChatError::Generation { .. }));
    assert_eq!(engine.history_len("s1").await, 0);
}

#[tokio::test]
async fn empty_answer_is_a_generation_error() {
    let store = seeded_store().await;
    let engine = engine_with(store, Arc::new(MockChatModel::with_replies(["   "])));

    let err = engine.ask("anything", "s1").await.unwrap_err();
    assert!(matches!(err, ChatError::Generation { .. }));
    assert_eq!(engine.history_len("s1").await, 0);
}

#[tokio::test]
async fn history_accumulates_and_feeds_later_prompts() {
    let store = seeded_store().await;
    let model = Arc::new(MockChatModel::with_replies(["first answer", "second answer"]));
    let engine = engine_with(store, model.clone());

    engine.ask("first question", "s1").await.unwrap();
    engine.ask("second question", "s1").await.unwrap();
    assert_eq!(engine.history_len("s1").await, 2);

    // The second prompt replays the first turn before the new question.
    let prompts = model.prompts();
    let second = &prompts[1];
    assert!(second.iter().any(|m| m.role == Role::User && m.content == "first question"));
    assert!(second.iter().any(|m| m.role == Role::Assistant && m.content == "first answer"));
}

#[tokio::test]
async fn sessions_do_not_leak_into_each_other() {
    let store = seeded_store().await;
    let model = Arc::new(MockChatModel::with_replies(["a1", "b1"]));
    let engine = engine_with(store, model.clone());

    engine.ask("question in a", "a").await.unwrap();
    engine.ask("question in b", "b").await.unwrap();

    // Session b's prompt has no trace of session a's turn.
    let prompt_b = &model.prompts()[1];
    assert!(!prompt_b.iter().any(|m| m.content.contains("question in a")));
}

#[tokio::test]
async fn pii_warning_annotates_but_never_blocks() {
    let store = seeded_store().await;
    let engine = engine_with(store, Arc::new(MockChatModel::with_replies(["answered anyway"])));

    let answer = engine.ask("Can I terminate Jane Doe today?", "s1").await.unwrap();
    assert!(answer.pii_notice);
    assert_eq!(answer.text, "answered anyway");
    assert_eq!(engine.history_len("s1").await, 1);
}

#[tokio::test]
async fn concurrent_question_in_same_session_is_rejected() {
    let store = seeded_store().await;
    let started = Arc::new(tokio::sync::Notify::new());
    let release = Arc::new(tokio::sync::Notify::new());
    let model = Arc::new(BlockingModel { started: started.clone(), release: release.clone() });
    let engine = Arc::new(engine_with(store, model));

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.ask("slow question", "s1").await })
    };
    started.notified().await;

    // The session guard is held by the in-flight question.
    let err = engine.ask("impatient question", "s1").await.unwrap_err();
    assert!(matches!(err, ChatError::SessionBusy { .. }));

    release.notify_one();
    let answer = first.await.unwrap().unwrap();
    assert_eq!(answer.text, "done");
    assert_eq!(engine.history_len("s1").await, 1);
}
