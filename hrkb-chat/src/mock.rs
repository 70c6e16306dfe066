//! Mock chat model for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ChatError, Result};
use crate::llm::{ChatMessage, ChatModel};

/// A scripted [`ChatModel`] that replays queued replies in order.
///
/// An empty queue yields a generation error, which makes failure paths easy
/// to exercise. The prompts it received are recorded for assertions.
#[derive(Debug, Default)]
pub struct MockChatModel {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChatModel {
    /// Create a mock with no queued replies (every call fails).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that replays the given replies in order.
    pub fn with_replies(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        replies.reverse();
        Self { replies: Mutex::new(replies), prompts: Mutex::new(Vec::new()) }
    }

    /// The full prompts passed to [`generate`](ChatModel::generate), in call order.
    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, messages: &[ChatMessage], _temperature: f32) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.replies.lock().unwrap().pop().ok_or_else(|| ChatError::Generation {
            provider: "mock".to_string(),
            message: "no scripted reply queued".to_string(),
        })
    }
}
