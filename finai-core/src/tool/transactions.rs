//! Mock transaction reader tool

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::{parameters_schema, parse_args, Tool, ToolContext, ToolDefinition};
use crate::transactions::{extract_categories, extract_summary, parse_transactions, TransactionFeed};

#[derive(Debug, Default, Deserialize, JsonSchema)]
struct ReadMockTransactionsArgs {
    /// Output format: 'full' for complete data, 'summary' for just totals and categories (default: 'full')
    #[serde(default)]
    format: Option<String>,
}

/// Gives the agent the mock credit card history
pub struct ReadMockTransactionsTool {
    feed: TransactionFeed,
}

impl ReadMockTransactionsTool {
    /// Create the tool over a feed
    pub fn new(feed: TransactionFeed) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Tool for ReadMockTransactionsTool {
    fn name(&self) -> String {
        "read_mock_transactions".to_string()
    }

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Read mock credit card transaction history from a file. Returns detailed \
                transaction data including merchant names, products purchased, and amounts. Use this \
                to analyze spending patterns, identify products, or provide financial insights based \
                on realistic transaction data."
                .to_string(),
            parameters: parameters_schema::<ReadMockTransactionsArgs>(),
            requires_confirmation: false,
        }
    }

    async fn call(&self, _ctx: &ToolContext, arguments: &str) -> anyhow::Result<serde_json::Value> {
        let args: ReadMockTransactionsArgs = parse_args("read_mock_transactions", arguments)?;
        let content = self.feed.read_raw().await?;
        let transactions = parse_transactions(&content);

        let result = match args.format.as_deref() {
            Some("summary") => json!({
                "format": "summary",
                "total_transactions": transactions.len(),
                "summary": extract_summary(&content),
                "categories": extract_categories(&content),
            }),
            _ => json!({
                "format": "full",
                "total_transactions": transactions.len(),
                "transactions": transactions,
                "raw_content": content,
            }),
        };

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "\
DATE | MERCHANT | PRODUCT | AMOUNT | INCOMING
2026-01-30 | Amazon | Echo Dot | $49.99 | F
2026-01-29 | Netflix | Premium Plan | $22.99 | F
=======
TOTAL TRANSACTIONS: 2
TOTAL AMOUNT: $72.98
CATEGORY BREAKDOWN:
- Electronics: $49.99
- Streaming: $22.99
";

    async fn tool_with_feed() -> (tempfile::TempDir, ReadMockTransactionsTool) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("feed.txt");
        tokio::fs::write(&path, FEED).await.expect("write");
        (dir, ReadMockTransactionsTool::new(TransactionFeed::new(path)))
    }

    #[tokio::test]
    async fn test_full_format_default() {
        let (_dir, tool) = tool_with_feed().await;
        let result = tool
            .call(&ToolContext::default(), "{}")
            .await
            .expect("should succeed");

        assert_eq!(result["format"], "full");
        assert_eq!(result["total_transactions"], 2);
        assert_eq!(result["transactions"][1]["merchant"], "Netflix");
        assert_eq!(result["raw_content"], FEED);
    }

    #[tokio::test]
    async fn test_summary_format() {
        let (_dir, tool) = tool_with_feed().await;
        let result = tool
            .call(&ToolContext::default(), r#"{"format": "summary"}"#)
            .await
            .expect("should succeed");

        assert_eq!(result["format"], "summary");
        assert_eq!(result["categories"]["Streaming"], "$22.99");
        assert!(result["summary"]
            .as_str()
            .unwrap_or_default()
            .starts_with("TOTAL TRANSACTIONS: 2"));
        assert!(result.get("transactions").is_none());
    }

    #[tokio::test]
    async fn test_missing_feed_is_error() {
        let tool = ReadMockTransactionsTool::new(TransactionFeed::new("/nonexistent/feed.txt"));
        let err = tool.call(&ToolContext::default(), "{}").await.unwrap_err();
        assert!(err.to_string().contains("failed to read mock transactions file"));
    }
}
