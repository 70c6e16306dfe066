//! Configuration for the question-answering engine.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// Default HR-assistant persona and disclaimer.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an HR assistant for nonprofit organizations in Canada. \
Use the following context to answer questions accurately and helpfully.

IMPORTANT DISCLAIMERS:
- This tool provides general HR information only
- Not a substitute for professional legal or HR advice
- Consult qualified professionals before implementing policies
- Do NOT share personal information about specific individuals

Provide a clear, helpful answer. If you're not certain, say so. Always \
remind users to consult HR/legal professionals for important decisions.";

/// Configuration parameters for the QA engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// Number of chunks retrieved to ground the answer.
    pub top_k: usize,
    /// Number of retrieved chunks returned to the caller as citations.
    /// May be smaller than `top_k`; the extras still ground the answer.
    pub cited_sources: usize,
    /// Sampling temperature for generation. Low by default, favoring
    /// determinism over creativity.
    pub temperature: f32,
    /// Maximum retained turns per session.
    pub max_turns: usize,
    /// The system instruction prepended to every prompt.
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            cited_sources: 3,
            temperature: 0.3,
            max_turns: 20,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ChatConfig {
    /// Create a new builder for constructing a [`ChatConfig`].
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`ChatConfig`].
#[derive(Debug, Clone, Default)]
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    /// Set the number of chunks retrieved to ground the answer.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the number of retrieved chunks cited back to the caller.
    pub fn cited_sources(mut self, n: usize) -> Self {
        self.config.cited_sources = n;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the maximum retained turns per session.
    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.config.max_turns = max_turns;
        self
    }

    /// Replace the system instruction.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Build the [`ChatConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if:
    /// - `top_k == 0`
    /// - `cited_sources > top_k`
    /// - `temperature` is not in `0.0..=2.0`
    pub fn build(self) -> Result<ChatConfig> {
        if self.config.top_k == 0 {
            return Err(ChatError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.cited_sources > self.config.top_k {
            return Err(ChatError::Config(format!(
                "cited_sources ({}) must not exceed top_k ({})",
                self.config.cited_sources, self.config.top_k
            )));
        }
        if !(0.0..=2.0).contains(&self.config.temperature) {
            return Err(ChatError::Config(format!(
                "temperature ({}) must be between 0.0 and 2.0",
                self.config.temperature
            )));
        }
        Ok(self.config)
    }
}
