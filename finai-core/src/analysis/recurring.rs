//! Recurring payment detection

use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{CheckedSet, Poller, Tick};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::provider::{complete_with_timeout, CompletionRequest, Provider};
use crate::transactions::{Transaction, TransactionFeed};

/// A payment the model judged to be recurring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecurringPayment {
    /// `rp-1`, `rp-2`, …
    pub id: String,
    /// Merchant name
    pub merchant: String,
    /// Product or plan
    pub product: String,
    /// Typical amount
    pub amount: f64,
    /// `Weekly`, `Bi-weekly`, `Monthly`, `Annual` or `Irregular`
    pub frequency: String,
    /// Most recent date the merchant appeared
    pub last_seen: String,
    /// How many times the merchant appears
    pub occurrences: u32,
}

#[derive(Debug, Default)]
struct Detection {
    payments: Vec<RecurringPayment>,
    detected: bool,
}

/// Latest detection result, shared with the HTTP handlers
#[derive(Debug, Default)]
pub struct RecurringStore {
    inner: RwLock<Detection>,
}

impl RecurringStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored payments and mark detection as done
    pub fn replace(&self, payments: Vec<RecurringPayment>) {
        let mut inner = self.inner.write();
        inner.payments = payments;
        inner.detected = true;
    }

    /// Copy of the stored payments
    pub fn payments(&self) -> Vec<RecurringPayment> {
        self.inner.read().payments.clone()
    }

    /// Whether a detection has completed yet
    pub fn is_detected(&self) -> bool {
        self.inner.read().detected
    }
}

/// Prompt listing every outgoing transaction and asking for a JSON array
pub fn build_recurring_prompt(transactions: &[Transaction]) -> String {
    let mut list = String::new();
    for tx in transactions {
        let _ = writeln!(list, "- {} | {} | {} | {}", tx.date, tx.merchant, tx.product, tx.amount);
    }

    format!(
        r#"You are analyzing a list of financial transactions to detect recurring payments.
A recurring payment is one where the same merchant appears multiple times, especially at regular intervals (weekly, bi-weekly, monthly, etc.), or is a known subscription service.

TRANSACTIONS:
{list}
TASK:
Identify all recurring or subscription-like payments. Group by merchant. For each, determine the frequency and typical amount.

RESPOND ONLY with a valid JSON array, no preamble, no markdown, no explanation. Each object must have these exact fields:
[
  {{
    "id": "rp-1",
    "merchant": "Netflix",
    "product": "Premium Plan Monthly Subscription",
    "amount": 22.99,
    "frequency": "Monthly",
    "lastSeen": "2026-01-29",
    "occurrences": 1
  }}
]

RULES:
- "id" must be "rp-1", "rp-2", etc.
- "amount" must be a number (no $ sign)
- "frequency" must be one of: "Weekly", "Bi-weekly", "Monthly", "Annual", "Irregular"
- "lastSeen" must be the most recent date that merchant appeared
- "occurrences" is how many times that merchant appears in the data
- Include known subscription services even if they only appear once (Netflix, Spotify, Hulu, Disney+, etc.)
- Include merchants that appear 2+ times even if the interval is irregular
- Do NOT include one-off purchases from merchants that only appear once and are not subscription services"#
    )
}

/// Parse the model's JSON array, tolerating a markdown code fence around it
pub fn parse_recurring_response(response: &str) -> Result<Vec<RecurringPayment>> {
    let trimmed = response.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = unfenced.strip_suffix("```").unwrap_or(unfenced).trim();

    serde_json::from_str(cleaned).map_err(|e| {
        Error::ResponseParse(format!(
            "failed to parse recurring payments JSON: {} (raw response: {})",
            e, cleaned
        ))
    })
}

/// Key identifying one snapshot of the outgoing feed
fn snapshot_key(transactions: &[Transaction]) -> String {
    let mut hasher = DefaultHasher::new();
    for tx in transactions {
        tx.fingerprint().hash(&mut hasher);
    }
    format!("{}:{:016x}", transactions.len(), hasher.finish())
}

/// Asks the model which outgoing payments recur and caches the answer
pub struct RecurringPaymentDetector {
    feed: TransactionFeed,
    provider: Arc<dyn Provider>,
    store: Arc<RecurringStore>,
    model: String,
    config: AnalysisConfig,
    checked: CheckedSet,
}

impl RecurringPaymentDetector {
    /// Create a detector writing into `store`
    pub fn new(
        feed: TransactionFeed,
        provider: Arc<dyn Provider>,
        store: Arc<RecurringStore>,
        model: impl Into<String>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            feed,
            provider,
            store,
            model: model.into(),
            config,
            checked: CheckedSet::new(),
        }
    }
}

#[async_trait]
impl Poller for RecurringPaymentDetector {
    fn name(&self) -> &'static str {
        "recurring_payments"
    }

    async fn tick(&self) -> Result<Tick> {
        let outgoing: Vec<Transaction> = self
            .feed
            .load()
            .await?
            .into_iter()
            .filter(|tx| !tx.is_incoming)
            .collect();
        if outgoing.is_empty() {
            info!(poller = self.name(), "No outgoing transactions to analyze");
            return Ok(Tick::Idle);
        }

        let snapshot = [snapshot_key(&outgoing)];
        if self.checked.claim_next(&snapshot, |k| Some(k.clone())).is_none() {
            self.checked.reset();
            return Ok(Tick::Exhausted);
        }

        info!(
            poller = self.name(),
            transactions = outgoing.len(),
            "Detecting recurring payments"
        );

        let request =
            CompletionRequest::prompt(&self.model, build_recurring_prompt(&outgoing)).max_tokens(2000);
        let reply =
            complete_with_timeout(self.provider.as_ref(), request, self.config.ai_timeout).await?;
        let payments = parse_recurring_response(&reply)?;

        info!(poller = self.name(), count = payments.len(), "Recurring payments detected");
        self.store.replace(payments);

        Ok(Tick::Processed)
    }

    fn reset_delay(&self) -> Duration {
        self.config.recurring_reset_delay
    }
}
