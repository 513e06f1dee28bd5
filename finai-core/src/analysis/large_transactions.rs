//! Warnings for unusually large outgoing payments

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::{CheckedSet, Poller, Tick};
use crate::alerts::{Alert, AlertBoard, AlertKind};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::provider::{complete_with_timeout, CompletionRequest, Provider};
use crate::transactions::{Transaction, TransactionFeed};

/// Prompt asking for a one-line caution about a large purchase
pub fn build_caution_prompt(tx: &Transaction, threshold: f64) -> String {
    format!(
        "A user just made a large purchase (over ${threshold:.2}).

PURCHASE DETAILS:
- Product: {}
- Amount: {}
- Merchant: {}
- Date: {}

Write ONE short, friendly caution for the user's notice board, at most 15 words. \
Mention the product and suggest one concrete check (return window, price match, budget impact). \
No preamble, no quotes.",
        tx.product, tx.amount, tx.merchant, tx.date,
    )
}

/// Outgoing rows at or above `threshold`, in feed order
pub fn large_outgoing(transactions: &[Transaction], threshold: f64) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| !tx.is_incoming && tx.amount_value() >= threshold)
        .cloned()
        .collect()
}

/// Posts a caution for each large outgoing payment
pub struct LargeTransactionMonitor {
    feed: TransactionFeed,
    provider: Arc<dyn Provider>,
    board: Arc<AlertBoard>,
    model: String,
    config: AnalysisConfig,
    checked: CheckedSet,
}

impl LargeTransactionMonitor {
    /// Create a monitor posting to `board`
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
}

#[async_trait]
impl Poller for LargeTransactionMonitor {
    fn name(&self) -> &'static str {
        "large_transactions"
    }

    async fn tick(&self) -> Result<Tick> {
        let threshold = self.config.large_transaction_threshold;
        let large = large_outgoing(&self.feed.load().await?, threshold);
        if large.is_empty() {
            return Ok(Tick::Idle);
        }

        let Some(tx) = self
            .checked
            .claim_next(&large, |tx| Some(tx.fingerprint()))
        else {
            self.checked.reset();
            return Ok(Tick::Exhausted);
        };

        info!(
            poller = self.name(),
            product = %tx.product,
            amount = %tx.amount,
            "Large purchase detected"
        );

        let request =
            CompletionRequest::prompt(&self.model, build_caution_prompt(tx, threshold)).max_tokens(100);
        let caution =
            complete_with_timeout(self.provider.as_ref(), request, self.config.ai_timeout).await?;
        if caution.is_empty() {
            info!(poller = self.name(), "Empty caution, skipping");
            return Ok(Tick::Processed);
        }

        let message = format!(
            "Large purchase: {} at {} ({}) - {}",
            tx.product, tx.merchant, tx.amount, caution
        );
        info!(poller = self.name(), "Posted caution: {}", message);
        self.board.post(Alert::new("large", message, AlertKind::Warning));

        Ok(Tick::Processed)
    }

    fn reset_delay(&self) -> Duration {
        self.config.reset_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::{write_feed, ScriptedProvider};
    use crate::transactions::parse_transactions;

    const ROWS: [&str; 4] = [
        "2026-01-28 | Best Buy | Sony WH-1000XM5 | $399.99 | F",
        "2026-01-27 | Starbucks | Latte | $6.45 | F",
        "2026-01-26 | Employer | Payroll Deposit | $3,200.00 | T",
        "2026-01-25 | Apple | iPad Air | $1,099.00 | F",
    ];

    #[test]
    fn test_large_outgoing_filter() {
        let feed = format!("DATE | MERCHANT | PRODUCT | AMOUNT | INCOMING\n{}", ROWS.join("\n"));
        let large = large_outgoing(&parse_transactions(&feed), 100.0);
        let products: Vec<_> = large.iter().map(|tx| tx.product.as_str()).collect();
        assert_eq!(products, vec!["Sony WH-1000XM5", "iPad Air"]);

        assert_eq!(large_outgoing(&parse_transactions(&feed), 399.99).len(), 2);
        assert!(large_outgoing(&parse_transactions(&feed), 5000.0).is_empty());
    }

    #[tokio::test]
    async fn test_monitor_posts_warnings_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rows: Vec<String> = ROWS.iter().map(|r| r.to_string()).collect();
        let path = write_feed(&dir, &rows).await;

        let provider = Arc::new(ScriptedProvider::new([
            "Check the 30-day return window.",
            "",
        ]));
        let board = Arc::new(AlertBoard::new(10));
        let monitor = LargeTransactionMonitor::new(
            TransactionFeed::new(path),
            provider.clone(),
            board.clone(),
            "m",
            AnalysisConfig::default(),
        );

        assert_eq!(monitor.tick().await.expect("tick"), Tick::Processed);
        assert_eq!(monitor.tick().await.expect("tick"), Tick::Processed);
        assert_eq!(monitor.tick().await.expect("tick"), Tick::Exhausted);

        let alerts = board.snapshot();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Warning);
        assert!(alerts[0].id.starts_with("large-"));
        assert_eq!(
            alerts[0].message,
            "Large purchase: Sony WH-1000XM5 at Best Buy ($399.99) - Check the 30-day return window."
        );

        let prompts = provider.prompts();
        assert!(prompts[0].contains("over $100.00"));
        assert!(prompts[1].contains("- Product: iPad Air"));
    }

    #[tokio::test]
    async fn test_idle_without_large_purchases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_feed(&dir, &[ROWS[1].to_string()]).await;
        let provider = Arc::new(ScriptedProvider::default());
        let monitor = LargeTransactionMonitor::new(
            TransactionFeed::new(path),
            provider.clone(),
            Arc::new(AlertBoard::new(10)),
            "m",
            AnalysisConfig::default(),
        );

        assert_eq!(monitor.tick().await.expect("tick"), Tick::Idle);
        assert!(provider.prompts().is_empty());
    }
}
