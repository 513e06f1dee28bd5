//! Provider trait for LLM integrations

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::message::Message;

/// Request for a single completion
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model name to use
    pub model: String,
    /// Optional system prompt
    pub system_prompt: Option<String>,
    /// Conversation history
    pub messages: Vec<Message>,
    /// Optional max tokens
    pub max_tokens: Option<u64>,
    /// Optional temperature setting
    pub temperature: Option<f64>,
}

impl CompletionRequest {
    /// Single-turn request carrying one user prompt
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::user(prompt)],
            ..Default::default()
        }
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Trait for LLM providers
///
/// Implement this trait to add support for a new LLM provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run a completion and return the concatenated text of the reply
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Get provider name (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Run a completion with a deadline, trimming the reply
pub async fn complete_with_timeout(
    provider: &dyn Provider,
    request: CompletionRequest,
    timeout: Duration,
) -> Result<String> {
    match tokio::time::timeout(timeout, provider.complete(request)).await {
        Ok(reply) => reply.map(|text| text.trim().to_string()),
        Err(_) => Err(Error::ProviderTimeout {
            timeout_secs: timeout.as_secs(),
        }),
    }
}
