//! # hrkb-chat
//!
//! Retrieval-augmented question answering for the HR knowledge-base
//! chatbot. Questions are embedded, grounded with the most similar chunks
//! from the shared vector store collection, answered by a hosted chat
//! model, and cited back to their source documents.
//!
//! ## Overview
//!
//! - [`ChatModel`] — generation seam, with an OpenAI backend behind the
//!   `openai` feature and [`MockChatModel`] for tests
//! - [`SessionStore`] — bounded, session-keyed conversation history
//! - [`PiiDetector`] — pluggable pre-check that annotates (never blocks)
//! - [`QaEngine`] — embed → retrieve → prompt → generate → cite
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hrkb_chat::{ChatConfig, QaEngine};
//!
//! let engine = QaEngine::builder()
//!     .config(ChatConfig::default())
//!     .collection("hr_knowledge")
//!     .embedder(embedder)
//!     .store(store)
//!     .model(model)
//!     .build()?;
//!
//! let answer = engine.ask("What notice period applies to layoffs?", "session-1").await?;
//! for cited in &answer.sources {
//!     println!("source: {}", cited.chunk.metadata.source);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod mock;
pub mod pii;
pub mod session;

#[cfg(feature = "openai")]
pub mod openai;

pub use config::{ChatConfig, ChatConfigBuilder, DEFAULT_SYSTEM_PROMPT};
pub use engine::{Answer, QaEngine, QaEngineBuilder};
pub use error::{ChatError, Result};
pub use llm::{ChatMessage, ChatModel, Role};
pub use mock::MockChatModel;
pub use pii::{NameHeuristicDetector, PiiDetector};
pub use session::{SessionHistory, SessionStore, Turn};

#[cfg(feature = "openai")]
pub use openai::OpenAiChatModel;
