//! Spending analysis over the banking transaction history

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parameters_schema, parse_args, Tool, ToolContext, ToolDefinition};
use crate::banking::BankingExecutor;
use crate::error::Error;

const DEFAULT_DAYS: i64 = 30;
const FETCH_LIMIT: i64 = 100;

/// Fetch `get_transactions` from the executor, keeping only object rows
pub(crate) async fn fetch_bank_transactions(
    executor: &dyn BankingExecutor,
    ctx: &ToolContext,
    limit: i64,
) -> crate::error::Result<Vec<Map<String, Value>>> {
    let response = executor
        .execute(ctx.execute_request("get_transactions", json!({ "limit": limit })))
        .await
        .map_err(|e| Error::Banking(format!("failed to fetch transactions: {}", e)))?;

    if !response.success {
        return Err(Error::Banking(format!(
            "transaction fetch failed: {}",
            response.error.unwrap_or_default()
        )));
    }

    Ok(response
        .data
        .get("transactions")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.as_object().cloned())
                .collect()
        })
        .unwrap_or_default())
}

/// Spending frequency bucket: transactions per week
pub fn velocity(transaction_count: usize, days: i64) -> &'static str {
    let per_week = transaction_count as f64 / days.max(1) as f64 * 7.0;
    if per_week < 2.0 {
        "low"
    } else if per_week < 7.0 {
        "moderate"
    } else {
        "high"
    }
}

/// Totals and insights over executor transaction rows
pub fn analyze_transactions(transactions: &[Map<String, Value>], days: i64) -> Value {
    if transactions.is_empty() {
        return json!({ "summary": "No transactions found in the specified period" });
    }

    let days = days.max(1);
    let (mut total_spent, mut total_received) = (0.0_f64, 0.0_f64);
    let (mut spend_count, mut receive_count) = (0_usize, 0_usize);

    for tx in transactions {
        let Some(amount) = tx.get("amount").and_then(Value::as_f64) else {
            continue;
        };
        match tx.get("type").and_then(Value::as_str) {
            Some("send") => {
                total_spent += amount;
                spend_count += 1;
            }
            Some("receive") => {
                total_received += amount;
                receive_count += 1;
            }
            _ => {}
        }
    }

    let avg_daily_spend = total_spent / days as f64;

    json!({
        "total_spent": format!("{:.2}", total_spent),
        "total_received": format!("{:.2}", total_received),
        "spend_count": spend_count,
        "receive_count": receive_count,
        "avg_daily_spend": format!("{:.2}", avg_daily_spend),
        "velocity": velocity(spend_count, days),
        "insights": [
            format!("You made {} spending transactions over {} days", spend_count, days),
            format!("Average daily spend: ${:.2}", avg_daily_spend),
            "Consider setting up savings goals to build financial cushion",
        ],
    })
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
struct AnalyzeSpendingArgs {
    /// Number of days to analyze (default: 30)
    #[serde(default)]
    days: Option<i64>,
}

/// Spending velocity and totals over the banking history
pub struct AnalyzeSpendingTool {
    executor: Arc<dyn BankingExecutor>,
}

impl AnalyzeSpendingTool {
    /// Create the tool over a banking executor
    pub fn new(executor: Arc<dyn BankingExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tool for AnalyzeSpendingTool {
    fn name(&self) -> String {
        "analyze_spending".to_string()
    }

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Analyze the user's spending patterns over a specified time period. \
                Returns insights about spending velocity, categories, and trends."
                .to_string(),
            parameters: parameters_schema::<AnalyzeSpendingArgs>(),
            requires_confirmation: false,
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value> {
        let args: AnalyzeSpendingArgs = parse_args("analyze_spending", arguments)?;
        let days = args.days.filter(|d| *d > 0).unwrap_or(DEFAULT_DAYS);

        let transactions = fetch_bank_transactions(self.executor.as_ref(), ctx, FETCH_LIMIT).await?;

        Ok(json!({
            "period_days": days,
            "total_transactions": transactions.len(),
            "analysis": analyze_transactions(&transactions, days),
            "generated_at": Utc::now().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::{ExecuteRequest, ExecuteResponse};
    use parking_lot::Mutex;

    struct StubExecutor {
        response: ExecuteResponse,
        seen: Mutex<Vec<ExecuteRequest>>,
    }

    #[async_trait]
    impl BankingExecutor for StubExecutor {
        async fn execute(&self, request: ExecuteRequest) -> crate::error::Result<ExecuteResponse> {
            self.seen.lock().push(request);
            Ok(self.response.clone())
        }
    }

    fn rows() -> Value {
        json!({"transactions": [
            {"type": "send", "amount": 60.0},
            {"type": "send", "amount": 30.0},
            {"type": "receive", "amount": 500.0},
            {"type": "fee", "amount": 1.0},
            "not an object"
        ]})
    }

    #[test]
    fn test_velocity_buckets() {
        assert_eq!(velocity(1, 30), "low");
        assert_eq!(velocity(10, 30), "moderate");
        assert_eq!(velocity(30, 30), "high");
        assert_eq!(velocity(3, 0), "high");
    }

    #[test]
    fn test_analyze_empty() {
        let analysis = analyze_transactions(&[], 30);
        assert_eq!(analysis["summary"], "No transactions found in the specified period");
    }

    #[test]
    fn test_analyze_skips_non_numeric_amounts() {
        let rows: Vec<Map<String, Value>> = [
            json!({"type": "send", "amount": 40.0}),
            json!({"type": "send", "amount": "25.00"}),
            json!({"type": "send"}),
            json!({"type": "receive", "amount": "100"}),
        ]
        .into_iter()
        .filter_map(|row| row.as_object().cloned())
        .collect();

        let analysis = analyze_transactions(&rows, 10);
        assert_eq!(analysis["spend_count"], 1);
        assert_eq!(analysis["receive_count"], 0);
        assert_eq!(analysis["total_spent"], "40.00");
        assert_eq!(analysis["total_received"], "0.00");
        assert_eq!(analysis["avg_daily_spend"], "4.00");
        assert_eq!(
            analysis["insights"][0],
            "You made 1 spending transactions over 10 days"
        );
    }

    #[tokio::test]
    async fn test_analyze_spending_tool() {
        let executor = Arc::new(StubExecutor {
            response: ExecuteResponse {
                success: true,
                data: rows(),
                error: None,
            },
            seen: Mutex::new(Vec::new()),
        });
        let tool = AnalyzeSpendingTool::new(executor.clone());
        let ctx = ToolContext {
            user_id: "u1".to_string(),
            request_id: "r1".to_string(),
            auth_token: None,
        };

        let result = tool.call(&ctx, r#"{"days": 10}"#).await.expect("should succeed");
        assert_eq!(result["period_days"], 10);
        assert_eq!(result["total_transactions"], 4);
        assert_eq!(result["analysis"]["total_spent"], "90.00");
        assert_eq!(result["analysis"]["total_received"], "500.00");
        assert_eq!(result["analysis"]["avg_daily_spend"], "9.00");
        assert_eq!(result["analysis"]["velocity"], "low");

        let seen = executor.seen.lock();
        assert_eq!(seen[0].tool, "get_transactions");
        assert_eq!(seen[0].user_id, "u1");
        assert_eq!(seen[0].input["limit"], 100);
    }

    #[tokio::test]
    async fn test_executor_refusal_is_error() {
        let executor = Arc::new(StubExecutor {
            response: ExecuteResponse {
                success: false,
                data: Value::Null,
                error: Some("unauthorized".to_string()),
            },
            seen: Mutex::new(Vec::new()),
        });
        let tool = AnalyzeSpendingTool::new(executor);
        let err = tool.call(&ToolContext::default(), "{}").await.unwrap_err();
        assert!(err.to_string().contains("transaction fetch failed: unauthorized"));
    }
}
