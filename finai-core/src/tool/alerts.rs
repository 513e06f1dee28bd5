//! Tools that post to and read from the alert board

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{parameters_schema, parse_args, Tool, ToolContext, ToolDefinition};
use crate::alerts::{Alert, AlertBoard, AlertKind};
use crate::error::Error;

const DEFAULT_LOOKBACK_HOURS: i64 = 24;

#[derive(Debug, Deserialize, JsonSchema)]
struct PostAlertArgs {
    /// The alert message to display to the user (be clear and actionable)
    message: String,
    /// Alert type: 'info' (general insight), 'warning' (concern or caution), or 'success' (positive news or achievement)
    #[serde(rename = "type")]
    kind: String,
}

/// Posts an insight to the user's alert sidebar
pub struct PostAlertTool {
    board: Arc<AlertBoard>,
}

impl PostAlertTool {
    /// Create the tool over a shared board
    pub fn new(board: Arc<AlertBoard>) -> Self {
        Self { board }
    }
}

#[async_trait]
impl Tool for PostAlertTool {
    fn name(&self) -> String {
        "post_alert".to_string()
    }

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Post an important notification or insight to the user's alert sidebar. \
                Use this to proactively notify users about spending patterns, savings opportunities, \
                unusual transactions, budget concerns, or financial recommendations. \
                Alerts appear in the left sidebar and persist for 24 hours."
                .to_string(),
            parameters: parameters_schema::<PostAlertArgs>(),
            requires_confirmation: false,
        }
    }

    async fn call(&self, _ctx: &ToolContext, arguments: &str) -> anyhow::Result<serde_json::Value> {
        let args: PostAlertArgs = parse_args("post_alert", arguments)?;
        if args.message.trim().is_empty() {
            return Err(Error::tool_arguments("post_alert", "message is required").into());
        }

        let kind = args.kind.parse::<AlertKind>().unwrap_or_default();
        let alert = Alert::new("alert", args.message, kind);
        let response = json!({
            "alert_id": alert.id,
            "message": alert.message,
            "type": alert.kind,
            "timestamp": alert.timestamp.to_rfc3339(),
            "status": "Alert posted successfully and will appear in the user's notification sidebar",
        });

        info!(kind = %kind, "Alert posted: {}", alert.message);
        self.board.post(alert);

        Ok(response)
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
struct ReadAlertsArgs {
    /// Optional: Number of hours to look back (default: 24)
    #[serde(default)]
    hours: Option<String>,
    /// Optional: Filter by alert type ('info', 'warning', 'success'). Omit to see all types.
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Reads back the alerts currently on the board
pub struct ReadAlertsTool {
    board: Arc<AlertBoard>,
}

impl ReadAlertsTool {
    /// Create the tool over a shared board
    pub fn new(board: Arc<AlertBoard>) -> Self {
        Self { board }
    }
}

#[async_trait]
impl Tool for ReadAlertsTool {
    fn name(&self) -> String {
        "read_alerts".to_string()
    }

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Read current alerts from the user's notification sidebar. Use this to check \
                what insights or notifications have been previously posted, avoid duplicate alerts, \
                or reference past notifications in conversation."
                .to_string(),
            parameters: parameters_schema::<ReadAlertsArgs>(),
            requires_confirmation: false,
        }
    }

    async fn call(&self, _ctx: &ToolContext, arguments: &str) -> anyhow::Result<serde_json::Value> {
        let args: ReadAlertsArgs = parse_args("read_alerts", arguments)?;

        let hours = args
            .hours
            .as_deref()
            .and_then(|h| h.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_LOOKBACK_HOURS);
        let kind_filter = args.kind.filter(|k| !k.is_empty());

        let now = Utc::now();
        let alerts: Vec<_> = self
            .board
            .recent_at(hours, now)
            .into_iter()
            .filter(|alert| {
                kind_filter
                    .as_deref()
                    .map_or(true, |kind| alert.kind.as_str() == kind)
            })
            .map(|alert| {
                json!({
                    "id": alert.id,
                    "message": alert.message,
                    "type": alert.kind,
                    "timestamp": alert.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                    "age_hours": alert.age_hours(now),
                })
            })
            .collect();

        let mut result = json!({
            "total_alerts": alerts.len(),
            "hours_looked_back": hours,
            "alerts": alerts,
        });
        if let Some(kind) = kind_filter {
            result["filtered_by_type"] = json!(kind);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Arc<AlertBoard> {
        Arc::new(AlertBoard::new(10))
    }

    #[tokio::test]
    async fn test_post_alert_defaults_unknown_type() {
        let board = board();
        let tool = PostAlertTool::new(board.clone());

        let result = tool
            .call(&ToolContext::default(), r#"{"message": "Coffee spend up 40%", "type": "urgent"}"#)
            .await
            .expect("should succeed");

        assert_eq!(result["type"], "info");
        assert!(result["alert_id"].as_str().unwrap_or_default().starts_with("alert-"));
        assert_eq!(board.len(), 1);
        assert_eq!(board.snapshot()[0].kind, AlertKind::Info);
    }

    #[tokio::test]
    async fn test_post_alert_requires_message() {
        let board = board();
        let tool = PostAlertTool::new(board.clone());

        let err = tool
            .call(&ToolContext::default(), r#"{"message": "", "type": "info"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("message is required"));
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn test_read_alerts_filters_by_type() {
        let board = board();
        board.post(Alert::new("a", "first", AlertKind::Info));
        board.post(Alert::new("a", "second", AlertKind::Warning));
        board.post(Alert::new("a", "third", AlertKind::Warning));

        let tool = ReadAlertsTool::new(board);
        let all = tool
            .call(&ToolContext::default(), "")
            .await
            .expect("should succeed");
        assert_eq!(all["total_alerts"], 3);
        assert_eq!(all["hours_looked_back"], 24);
        assert!(all.get("filtered_by_type").is_none());

        let warnings = tool
            .call(&ToolContext::default(), r#"{"hours": "2", "type": "warning"}"#)
            .await
            .expect("should succeed");
        assert_eq!(warnings["total_alerts"], 2);
        assert_eq!(warnings["hours_looked_back"], 2);
        assert_eq!(warnings["filtered_by_type"], "warning");
        assert_eq!(warnings["alerts"][0]["message"], "second");
    }

    #[tokio::test]
    async fn test_read_alerts_hours_edge_values() {
        let board = board();
        let mut stale = Alert::new("a", "last week", AlertKind::Info);
        stale.timestamp = Utc::now() - chrono::Duration::hours(170);
        board.post(stale);
        board.post(Alert::new("a", "today", AlertKind::Success));

        let tool = ReadAlertsTool::new(board);

        let huge = tool
            .call(&ToolContext::default(), r#"{"hours": "10000000000"}"#)
            .await
            .expect("should succeed");
        assert_eq!(huge["total_alerts"], 2);
        assert_eq!(huge["hours_looked_back"], 10_000_000_000_i64);

        let garbled = tool
            .call(&ToolContext::default(), r#"{"hours": "a while"}"#)
            .await
            .expect("should succeed");
        assert_eq!(garbled["hours_looked_back"], 24);
        assert_eq!(garbled["total_alerts"], 1);
        assert_eq!(garbled["alerts"][0]["message"], "today");
    }
}
