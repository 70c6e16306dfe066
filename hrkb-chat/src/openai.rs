//! OpenAI chat-completions backend.
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ChatError, Result};
use crate::llm::{ChatMessage, ChatModel, Role};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A [`ChatModel`] backed by the OpenAI chat completions API.
///
/// # Example
///
/// ```rust,ignore
/// use hrkb_chat::openai::OpenAiChatModel;
///
/// let model = OpenAiChatModel::from_env()?.with_model("gpt-4o");
/// let answer = model.generate(&messages, 0.3).await?;
/// ```
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiChatModel {
    /// Create a new client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::Generation {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self { client: reqwest::Client::new(), api_key, model: DEFAULT_MODEL.into() })
    }

    /// Create a new client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| ChatError::Generation {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `gpt-4o`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn api_error(&self, message: String) -> ChatError {
        ChatError::Generation { provider: self.model.clone(), message }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        debug!(model = %self.model, message_count = messages.len(), temperature, "generating answer");

        let request_body = CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage { role: wire_role(m.role), content: &m.content })
                .collect(),
            temperature,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "completion request failed");
                self.api_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(model = %self.model, %status, "completion API error");
            return Err(self.api_error(format!("API returned {status}: {detail}")));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| self.api_error(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.api_error("API returned no completion".into()))
    }
}
