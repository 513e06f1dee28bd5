//! Banking executor seam
//!
//! Banking operations (balances, transfers, savings) are executed by an
//! external service. The backend only forwards tool input to it and relays
//! the `{success, data, error}` answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// One request to the banking executor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// User on whose behalf the call runs
    pub user_id: String,
    /// Banking operation name, e.g. `get_balance`
    pub tool: String,
    /// Operation input
    pub input: serde_json::Value,
    /// Correlation id
    pub request_id: String,
    /// Bearer token of the caller, never serialized
    #[serde(skip)]
    pub auth_token: Option<String>,
}

/// Executor answer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// Operation output
    #[serde(default)]
    pub data: serde_json::Value,
    /// Error text when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Executes banking operations
#[async_trait]
pub trait BankingExecutor: Send + Sync {
    /// Run one operation
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse>;
}

/// Executor reached over HTTP
pub struct HttpBankingExecutor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBankingExecutor {
    /// Create an executor for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/tools/execute", self.base_url)
    }

    fn build_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| Error::Internal(e.to_string()))?,
            );
        }
        Ok(headers)
    }
}

#[async_trait]
impl BankingExecutor for HttpBankingExecutor {
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse> {
        debug!(tool = %request.tool, request_id = %request.request_id, "Forwarding banking call");

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.build_headers(request.auth_token.as_deref())?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Banking(format!(
                "{} failed with {}: {}",
                request.tool, status, text
            )));
        }

        Ok(response.json::<ExecuteResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(tool: &str) -> ExecuteRequest {
        ExecuteRequest {
            user_id: "user-1".to_string(),
            tool: tool.to_string(),
            input: json!({"limit": 100}),
            request_id: "req-1".to_string(),
            auth_token: Some("jwt-token".to_string()),
        }
    }

    #[tokio::test]
    async fn test_execute_forwards_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/tools/execute"))
            .and(header("authorization", "Bearer jwt-token"))
            .and(body_partial_json(json!({"tool": "get_transactions", "user_id": "user-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"transactions": []}
            })))
            .mount(&server)
            .await;

        let executor = HttpBankingExecutor::new(format!("{}/", server.uri())).expect("client");
        let response = executor
            .execute(request("get_transactions"))
            .await
            .expect("should succeed");

        assert!(response.success);
        assert_eq!(response.data, json!({"transactions": []}));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_execute_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let executor = HttpBankingExecutor::new(server.uri()).expect("client");
        let err = executor.execute(request("get_balance")).await.unwrap_err();
        assert!(matches!(err, Error::Banking(ref msg) if msg.contains("get_balance")));
    }
}
