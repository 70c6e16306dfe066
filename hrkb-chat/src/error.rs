//! Error types for the `hrkb-chat` crate.

use thiserror::Error;

/// Errors that can occur while answering a question.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The language model failed or returned empty content.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The chat model that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A question is already in flight for this session.
    #[error("Session '{session_id}' already has a question in flight")]
    SessionBusy {
        /// The busy session.
        session_id: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error propagated from the retrieval core (embedding or search).
    #[error(transparent)]
    Rag(#[from] hrkb_rag::RagError),
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
