//! Mock provider for testing

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{CompletionRequest, Error, Provider, Result};

/// A mock provider replaying scripted replies
///
/// Replies are returned in order; once the script runs out the fallback
/// reply is repeated. Every request is recorded.
pub struct MockProvider {
    script: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    /// Create a mock provider that always answers `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider answering `replies` in order, then failing
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider whose every call fails
    pub fn failing() -> Self {
        Self::scripted(Vec::<String>::new())
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// First user prompt of every request received so far
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.messages.first().map(|m| m.content.clone()))
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().push(request);

        if let Some(reply) = self.script.lock().pop_front() {
            return Ok(reply);
        }
        self.fallback
            .clone()
            .ok_or_else(|| Error::ProviderApi("mock provider has no reply left".to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockProvider::new("Hello, world!");
        for _ in 0..2 {
            let text = provider
                .complete(CompletionRequest::prompt("test", "Hi"))
                .await
                .expect("should succeed");
            assert_eq!(text, "Hello, world!");
        }
        assert_eq!(provider.prompts(), vec!["Hi", "Hi"]);
    }

    #[tokio::test]
    async fn test_scripted_then_exhausted() {
        let provider = MockProvider::scripted(["one", "two"]);
        let request = || CompletionRequest::prompt("test", "q");

        assert_eq!(provider.complete(request()).await.expect("first"), "one");
        assert_eq!(provider.complete(request()).await.expect("second"), "two");
        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, Error::ProviderApi(_)));
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failing() {
        let provider = MockProvider::failing();
        assert!(provider
            .complete(CompletionRequest::prompt("test", "q"))
            .await
            .is_err());
    }
}
