//! Cheaper-alternative scouting for recent purchases

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::{today, CheckedSet, Poller, Tick};
use crate::alerts::{Alert, AlertBoard, AlertKind};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::provider::{complete_with_timeout, CompletionRequest, Provider};
use crate::transactions::{filter_recent, Transaction, TransactionFeed};

const SAVE_MARKER: &str = "Save: $";
const SKIP_MARKERS: [&str; 3] = ["optimal", "not enough savings", "under $5"];

/// Prompt asking for one cheaper alternative in a fixed single-line format
pub fn build_alternative_prompt(tx: &Transaction, minimum_savings: f64) -> String {
    format!(
        r#"You are analyzing a purchase to find cheaper alternatives while preserving quality.

PURCHASE DETAILS:
- Product: {product}
- Price Paid: {amount}
- Merchant: {merchant}
- Date: {date}

TASK:
Find a cheaper alternative that maintains or improves quality. You MUST save at least ${min:.2} to recommend an alternative.

FORMAT YOUR RESPONSE EXACTLY LIKE THIS (no preamble):
"[Original Product] ($[original price]) - Alternative: [New Product] ($[new price]) - Save: $[difference] - Buy: [URL]"

EXAMPLES:
- "Echo Dot 5th Gen ($49.99) - Alternative: Google Nest Mini ($29.99) - Save: $20.00 - Buy: https://store.google.com/product/google_nest_mini"
- "Nike Air Max ($139.99) - Alternative: Adidas Ultraboost ($120.00) - Save: $19.99 - Buy: https://www.adidas.com/us/ultraboost"
- "Whole Foods Groceries ($127.83) - Alternative: Trader Joe's Organic Mix ($95.00) - Save: $32.83 - Buy: https://www.traderjoes.com"

CRITICAL RULES:
- MUST save at least ${min:.2} or respond: "Not enough savings (under ${min:.0})"
- MUST include a real, working purchase link (Amazon, official store, major retailer)
- Use exact format with " - " separators (no vertical pipes)
- Show all prices with $ and two decimal places
- Alternative must maintain or improve quality
- URL should be direct product page when possible
- Focus on 2026 realistic pricing and real retailers"#,
        product = tx.product,
        amount = tx.amount,
        merchant = tx.merchant,
        date = tx.date,
        min = minimum_savings,
    )
}

/// Dollar amount after `Save: $`, or `0.0` when missing or malformed
pub fn extract_savings(recommendation: &str) -> f64 {
    let Some(start) = recommendation.find(SAVE_MARKER) else {
        return 0.0;
    };
    let rest = &recommendation[start + SAVE_MARKER.len()..];
    let token = rest.split([' ', '-']).next().unwrap_or_default();
    let numeric_len = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());

    token[..numeric_len]
        .trim_end_matches('.')
        .parse()
        .unwrap_or(0.0)
}

/// Whether a model reply is a recommendation worth posting
pub fn should_post_recommendation(recommendation: &str, minimum_savings: f64) -> bool {
    if recommendation.is_empty() {
        return false;
    }

    let lower = recommendation.to_lowercase();
    if SKIP_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return false;
    }

    recommendation.contains(SAVE_MARKER) && extract_savings(recommendation) >= minimum_savings
}

/// Checks one recent purchase per tick for a cheaper alternative
pub struct ProductAlternativeScout {
    feed: TransactionFeed,
    provider: Arc<dyn Provider>,
    board: Arc<AlertBoard>,
    model: String,
    config: AnalysisConfig,
    checked: CheckedSet,
}

impl ProductAlternativeScout {
    /// Create a scout posting to `board`
    pub fn new(
        feed: TransactionFeed,
        provider: Arc<dyn Provider>,
        board: Arc<AlertBoard>,
        model: impl Into<String>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            feed,
            provider,
            board,
            model: model.into(),
            config,
            checked: CheckedSet::new(),
        }
    }

    /// Products checked since the last reset
    pub fn checked(&self) -> &CheckedSet {
        &self.checked
    }
}

#[async_trait]
impl Poller for ProductAlternativeScout {
    fn name(&self) -> &'static str {
        "alternatives"
    }

    async fn tick(&self) -> Result<Tick> {
        let transactions = self.feed.load().await?;
        let recent = filter_recent(&transactions, self.config.lookback_days, today());
        if recent.is_empty() {
            info!(poller = self.name(), "No recent transactions to analyze");
            return Ok(Tick::Idle);
        }

        let Some(tx) = self
            .checked
            .claim_next(&recent, |tx| (!tx.product.is_empty()).then(|| tx.product.clone()))
        else {
            self.checked.reset();
            return Ok(Tick::Exhausted);
        };

        info!(
            poller = self.name(),
            product = %tx.product,
            amount = %tx.amount,
            "Checking for cheaper alternatives"
        );

        let request = CompletionRequest::prompt(
            &self.model,
            build_alternative_prompt(tx, self.config.minimum_savings),
        )
        .max_tokens(200);
        let recommendation =
            complete_with_timeout(self.provider.as_ref(), request, self.config.ai_timeout).await?;

        if should_post_recommendation(&recommendation, self.config.minimum_savings) {
            info!(
                poller = self.name(),
                savings = extract_savings(&recommendation),
                "Posted alternative: {}",
                recommendation
            );
            self.board
                .post(Alert::new("alt", recommendation, AlertKind::Success));
        } else {
            info!(
                poller = self.name(),
                product = %tx.product,
                "No better alternative (insufficient savings or optimal)"
            );
        }

        Ok(Tick::Processed)
    }

    fn reset_delay(&self) -> Duration {
        self.config.reset_delay
    }
}
