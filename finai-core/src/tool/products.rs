//! AI-backed product tools

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::spending::fetch_bank_transactions;
use super::{parameters_schema, parse_args, Tool, ToolContext, ToolDefinition};
use crate::banking::BankingExecutor;
use crate::error::Error;
use crate::provider::{complete_with_timeout, CompletionRequest, Provider};

const TOOL_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_PROMPT_TRANSACTIONS: usize = 50;

#[derive(Debug, Default, Deserialize, JsonSchema)]
struct ProductSearchArgs {
    /// Name or description of the product to find alternatives for (e.g., 'Echo Dot Smart Speaker', 'Nike Running Shoes')
    product_name: String,
    /// Optional: Original price paid for the product (e.g., '$49.99')
    #[serde(default)]
    original_price: Option<String>,
    /// Optional: Specific criteria for alternatives (e.g., 'cheaper', 'better quality', 'more features', 'eco-friendly')
    #[serde(default)]
    search_criteria: Option<String>,
    /// Optional: Maximum price for alternatives (e.g., '$100')
    #[serde(default)]
    max_price: Option<String>,
    /// Optional: Specific category or type (e.g., 'smart speakers', 'athletic shoes', 'streaming services')
    #[serde(default)]
    category_filter: Option<String>,
}

fn build_search_prompt(args: &ProductSearchArgs) -> String {
    let mut prompt = format!("Search for alternative products to: **{}**\n\n", args.product_name);

    let optional = [
        ("Original price paid", &args.original_price),
        ("Search criteria", &args.search_criteria),
        ("Maximum price", &args.max_price),
        ("Category", &args.category_filter),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            let _ = writeln!(prompt, "{}: {}", label, value);
        }
    }

    prompt.push_str(
        "\nPlease provide:

1. **Top Alternative Products** (3-5 options):
   - Product name and brand
   - Current market price
   - Key features and specifications
   - Pros and cons compared to the original
   - Where to buy (online retailers)

2. **Price Comparison**:
   - How each alternative compares in price to the original
   - Value for money assessment

3. **Recommendation**:
   - Which alternative offers the best value
   - Why you recommend it
   - Any important considerations (reviews, reliability, warranty, etc.)

4. **Savings Opportunity**:
   - Potential savings if switching to recommended alternative
   - Whether the original purchase was a good deal

Format your response in a clear, structured way that's easy to read and make decisions from. \
Include specific product models and realistic 2026 pricing.",
    );
    prompt
}

/// Finds cheaper or better alternatives to a purchased product
pub struct SearchProductAlternativesTool {
    provider: Arc<dyn Provider>,
    model: String,
}

impl SearchProductAlternativesTool {
    /// Create the tool over a provider and model
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Tool for SearchProductAlternativesTool {
    fn name(&self) -> String {
        "search_product_alternatives".to_string()
    }

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Search for product alternatives and recommendations. Given a product name \
                or description from transaction history, find similar products, compare features and \
                prices, and suggest better alternatives. Use this when users ask for product \
                recommendations or want to find alternatives to something they purchased."
                .to_string(),
            parameters: parameters_schema::<ProductSearchArgs>(),
            requires_confirmation: false,
        }
    }

    async fn call(&self, _ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value> {
        let tool_name = self.name();
        let args: ProductSearchArgs = parse_args(&tool_name, arguments)?;
        if args.product_name.trim().is_empty() {
            return Err(Error::tool_arguments(tool_name, "product_name is required").into());
        }

        let request =
            CompletionRequest::prompt(&self.model, build_search_prompt(&args)).max_tokens(4096);
        let reply = complete_with_timeout(self.provider.as_ref(), request, TOOL_TIMEOUT)
            .await
            .map_err(|e| Error::tool_execution(&tool_name, format!("product search failed: {}", e)))?;

        let search_results = if reply.is_empty() {
            "No product alternatives found".to_string()
        } else {
            reply
        };

        Ok(json!({
            "product_searched": args.product_name,
            "original_price": args.original_price.unwrap_or_default(),
            "search_results": search_results,
            "generated_at": Utc::now().to_rfc3339(),
        }))
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
struct AnalyzeProductsArgs {
    /// Number of days to analyze (default: 30)
    #[serde(default)]
    days: Option<i64>,
    /// Maximum number of transactions to analyze (default: 50)
    #[serde(default)]
    limit: Option<i64>,
}

fn summarize_rows(transactions: &[Map<String, Value>]) -> String {
    let mut summary = String::from("Here are the recent transactions to analyze:\n\n");

    for (i, tx) in transactions.iter().take(MAX_PROMPT_TRANSACTIONS).enumerate() {
        let _ = writeln!(summary, "Transaction {}:", i + 1);
        if let Some(kind) = tx.get("type").and_then(Value::as_str) {
            let _ = writeln!(summary, "  Type: {}", kind);
        }
        if let Some(amount) = tx.get("amount").and_then(Value::as_f64) {
            let _ = writeln!(summary, "  Amount: ${:.2}", amount);
        }
        for (field, label) in [
            ("description", "Description"),
            ("merchant", "Merchant"),
            ("recipient", "Recipient"),
            ("sender", "Sender"),
            ("memo", "Memo"),
        ] {
            if let Some(value) = tx.get(field).and_then(Value::as_str).filter(|v| !v.is_empty()) {
                let _ = writeln!(summary, "  {}: {}", label, value);
            }
        }
        summary.push('\n');
    }

    summary
}

fn build_products_prompt(summary: &str) -> String {
    format!(
        "{summary}

Analyze these transactions and identify what products or services were purchased. For each transaction that represents a purchase:

1. Identify the product or service category (e.g., groceries, entertainment, dining, transportation, utilities, etc.)
2. Identify specific products if possible from merchant names or descriptions
3. Group similar purchases together

Provide your analysis in the following format:

**Purchase Categories:**
- [Category name]: [Number of transactions] - [Brief description of what was bought]

**Specific Products Identified:**
- [Product/Service name] from [Merchant] - $[Amount]

**Insights:**
- [Key findings about purchasing patterns]
- [Most frequent purchase types]
- [Any recommendations or observations]

Be specific and helpful. If transaction details are limited, make reasonable inferences based on merchant names and amounts."
    )
}

/// Asks the model what was bought, based on the banking history
pub struct AnalyzeProductsTool {
    executor: Arc<dyn BankingExecutor>,
    provider: Arc<dyn Provider>,
    model: String,
}

impl AnalyzeProductsTool {
    /// Create the tool over an executor, a provider and a model
    pub fn new(
        executor: Arc<dyn BankingExecutor>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Tool for AnalyzeProductsTool {
    fn name(&self) -> String {
        "analyze_products".to_string()
    }

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Analyze transaction history to identify what products or services were \
                purchased. Uses AI to understand transaction descriptions and categorize purchases."
                .to_string(),
            parameters: parameters_schema::<AnalyzeProductsArgs>(),
            requires_confirmation: false,
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value> {
        let tool_name = self.name();
        let args: AnalyzeProductsArgs = parse_args(&tool_name, arguments)?;
        let days = args.days.filter(|d| *d > 0).unwrap_or(30);
        let limit = args.limit.filter(|l| *l > 0).unwrap_or(50);

        let transactions = fetch_bank_transactions(self.executor.as_ref(), ctx, limit).await?;
        if transactions.is_empty() {
            return Ok(json!({
                "summary": "No transactions found in the specified period",
                "products": [],
            }));
        }

        let prompt = build_products_prompt(&summarize_rows(&transactions));
        let request = CompletionRequest::prompt(&self.model, prompt).max_tokens(2048);
        let reply = complete_with_timeout(self.provider.as_ref(), request, TOOL_TIMEOUT)
            .await
            .map_err(|e| Error::tool_execution(&tool_name, format!("AI analysis failed: {}", e)))?;

        let product_analysis = if reply.is_empty() {
            "No analysis generated".to_string()
        } else {
            reply
        };

        Ok(json!({
            "period_days": days,
            "transactions_analyzed": transactions.len(),
            "product_analysis": product_analysis,
            "generated_at": Utc::now().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banking::{ExecuteRequest, ExecuteResponse};
    use crate::error::Result;
    use parking_lot::Mutex;

    struct RecordingProvider {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.prompts.lock().push(request.messages[0].content.clone());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct FixedExecutor(Value);

    #[async_trait]
    impl BankingExecutor for FixedExecutor {
        async fn execute(&self, _request: ExecuteRequest) -> Result<ExecuteResponse> {
            Ok(ExecuteResponse {
                success: true,
                data: self.0.clone(),
                error: None,
            })
        }
    }

    #[tokio::test]
    async fn test_search_builds_prompt_from_optional_fields() {
        let provider = RecordingProvider::replying("Google Nest Mini ($29.99)");
        let tool = SearchProductAlternativesTool::new(provider.clone(), "test-model");

        let result = tool
            .call(
                &ToolContext::default(),
                r#"{"product_name": "Echo Dot", "original_price": "$49.99", "max_price": ""}"#,
            )
            .await
            .expect("should succeed");

        assert_eq!(result["product_searched"], "Echo Dot");
        assert_eq!(result["original_price"], "$49.99");
        assert_eq!(result["search_results"], "Google Nest Mini ($29.99)");

        let prompts = provider.prompts.lock();
        assert!(prompts[0].starts_with("Search for alternative products to: **Echo Dot**"));
        assert!(prompts[0].contains("Original price paid: $49.99\n"));
        assert!(!prompts[0].contains("Maximum price:"));
    }

    #[tokio::test]
    async fn test_search_requires_product_name() {
        let provider = RecordingProvider::replying("unused");
        let tool = SearchProductAlternativesTool::new(provider.clone(), "test-model");

        let err = tool
            .call(&ToolContext::default(), r#"{"product_name": " "}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("product_name is required"));
        assert!(provider.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_reply_placeholder() {
        let tool = SearchProductAlternativesTool::new(RecordingProvider::replying("  "), "m");
        let result = tool
            .call(&ToolContext::default(), r#"{"product_name": "Kindle"}"#)
            .await
            .expect("should succeed");
        assert_eq!(result["search_results"], "No product alternatives found");
    }

    #[tokio::test]
    async fn test_analyze_products() {
        let executor = Arc::new(FixedExecutor(json!({"transactions": [
            {"type": "send", "amount": 12.5, "merchant": "Blue Bottle", "memo": ""}
        ]})));
        let provider = RecordingProvider::replying("**Purchase Categories:** coffee");
        let tool = AnalyzeProductsTool::new(executor, provider.clone(), "m");

        let result = tool
            .call(&ToolContext::default(), "{}")
            .await
            .expect("should succeed");
        assert_eq!(result["period_days"], 30);
        assert_eq!(result["transactions_analyzed"], 1);
        assert_eq!(result["product_analysis"], "**Purchase Categories:** coffee");

        let prompts = provider.prompts.lock();
        assert!(prompts[0].contains("  Amount: $12.50\n"));
        assert!(prompts[0].contains("  Merchant: Blue Bottle\n"));
        assert!(!prompts[0].contains("Memo"));
    }

    #[tokio::test]
    async fn test_analyze_products_without_transactions() {
        let executor = Arc::new(FixedExecutor(json!({"transactions": []})));
        let provider = RecordingProvider::replying("unused");
        let tool = AnalyzeProductsTool::new(executor, provider.clone(), "m");

        let result = tool
            .call(&ToolContext::default(), "{}")
            .await
            .expect("should succeed");
        assert_eq!(result["products"], json!([]));
        assert!(provider.prompts.lock().is_empty());
    }
}
