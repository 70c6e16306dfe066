//! Chat model trait for answer generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and grounding context.
    System,
    /// The end user.
    User,
    /// The model's own prior replies.
    Assistant,
}

/// One message in a chat prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A language model that produces a single completed answer.
///
/// The engine needs only the final text, so the contract is synchronous
/// request/response; a streaming backend can satisfy it by collecting its
/// stream before returning.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model or deployment name, for logs and error messages.
    fn name(&self) -> &str;

    /// Generate a reply to the given messages at the given temperature.
    async fn generate(&self, messages: &[ChatMessage], temperature: f32) -> Result<String>;
}
