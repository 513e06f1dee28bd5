//! Anthropic (Claude) provider implementation

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CompletionRequest, Error, HttpConfig, Message, Provider, Result};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u64 = 4096;

/// Claude Sonnet 4
pub const CLAUDE_SONNET_4: &str = "claude-sonnet-4-20250514";
/// Claude 3.5 Haiku
pub const CLAUDE_3_5_HAIKU: &str = "claude-3-5-haiku-20241022";

/// Anthropic API client
pub struct Anthropic {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Anthropic {
    /// Create from API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = HttpConfig::default().build_client()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
        })
    }

    /// Create from environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::ProviderAuth("ANTHROPIC_API_KEY not set".to_string()))?;
        Self::new(api_key)
    }

    /// Point the client at another host, e.g. a proxy or a test server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|e| Error::Internal(e.to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        Ok(headers)
    }
}

/// Anthropic messages request
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

impl From<Message> for AnthropicMessage {
    fn from(message: Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl AnthropicResponse {
    fn text(self) -> String {
        self.content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect()
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let CompletionRequest {
            model,
            system_prompt,
            messages,
            max_tokens,
            temperature,
        } = request;

        let anthropic_request = AnthropicRequest {
            model,
            messages: messages.into_iter().map(AnthropicMessage::from).collect(),
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: system_prompt,
            temperature,
        };
        debug!(model = %anthropic_request.model, "Sending Anthropic request");

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(&anthropic_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Error::ProviderAuth(format!("Anthropic API error {}: {}", status, text))
                }
                _ => Error::ProviderApi(format!("Anthropic API error {}: {}", status, text)),
            });
        }

        let body: AnthropicResponse = response.json().await?;
        Ok(body.text())
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Anthropic {
        Anthropic::new("test-key")
            .expect("client")
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_complete_concatenates_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": CLAUDE_SONNET_4,
                "max_tokens": 200,
                "system": "be brief",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "type": "message",
                "content": [
                    {"type": "text", "text": "Hello "},
                    {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                    {"type": "text", "text": "there"}
                ]
            })))
            .mount(&server)
            .await;

        let request = CompletionRequest::prompt(CLAUDE_SONNET_4, "hello")
            .max_tokens(200)
            .system("be brief");
        let text = client(&server).complete(request).await.expect("should succeed");
        assert_eq!(text, "Hello there");
    }

    #[tokio::test]
    async fn test_default_max_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"max_tokens": DEFAULT_MAX_TOKENS})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .mount(&server)
            .await;

        let text = client(&server)
            .complete(CompletionRequest::prompt("m", "hi"))
            .await
            .expect("should succeed");
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "bad-key"})))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "busy"})))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let anthropic = client(&server);
        let auth = anthropic
            .complete(CompletionRequest::prompt("bad-key", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(auth, Error::ProviderAuth(_)));

        let api = anthropic
            .complete(CompletionRequest::prompt("busy", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(api, Error::ProviderApi(ref msg) if msg.contains("overloaded")));
    }
}
