//! Mock transaction feed
//!
//! The feed is a static text file with a pipe-delimited table:
//!
//! ```text
//! DATE       | MERCHANT | PRODUCT            | AMOUNT  | INCOMING
//! ------------------------------------------------------------------
//! 2026-01-30 | Amazon   | Echo Dot (5th Gen) | $49.99  | F
//! ==================================================================
//! ```
//!
//! It is parsed fresh on every read; rows have no identity beyond their
//! position in the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const HEADER_PREFIXES: [&str; 5] = ["MOCK", "Account", "Card", "Period", "DATE"];

/// A parsed row of the mock feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Date as written in the file (`YYYY-MM-DD`)
    pub date: String,
    /// Merchant name
    pub merchant: String,
    /// Product or service description
    pub product: String,
    /// Amount as written in the file, e.g. `$49.99`
    pub amount: String,
    /// Money coming in (`T`) rather than going out
    pub is_incoming: bool,
}

impl Transaction {
    /// Numeric amount, `0.0` when the text does not parse
    pub fn amount_value(&self) -> f64 {
        parse_amount(&self.amount)
    }

    /// Parsed date, if well formed
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    /// Stable key identifying this row by its contents
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.date, self.merchant, self.product, self.amount
        )
    }
}

/// Transaction as served over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTransaction {
    /// Positional id, `tx-1` for the first row
    pub id: String,
    /// Signed amount, negative for debits
    pub amount: f64,
    /// Product description
    pub description: String,
    /// Date string
    pub date: String,
    /// Merchant name
    pub merchant: String,
    /// Money coming in
    pub is_incoming: bool,
    /// `debit` or `credit`
    #[serde(rename = "type")]
    pub kind: String,
}

/// File-backed transaction feed
#[derive(Debug, Clone)]
pub struct TransactionFeed {
    path: PathBuf,
}

impl TransactionFeed {
    /// Create a feed over the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw file content
    pub async fn read_raw(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::TransactionFeed(format!(
                "failed to read mock transactions file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Read and parse every transaction in the file
    pub async fn load(&self) -> Result<Vec<Transaction>> {
        let content = self.read_raw().await?;
        Ok(parse_transactions(&content))
    }
}

/// Extract transactions from the feed's text content
pub fn parse_transactions(content: &str) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut in_data = false;

    for line in content.lines() {
        let line = line.trim();

        if line.contains("DATE") && line.contains("MERCHANT") {
            in_data = true;
            continue;
        }
        if in_data && line.starts_with("=======") {
            break;
        }
        if line.starts_with("----") {
            continue;
        }
        if !in_data || line.is_empty() || is_header_line(line) {
            continue;
        }
        if let Some(tx) = parse_line(line) {
            transactions.push(tx);
        }
    }

    transactions
}

fn is_header_line(line: &str) -> bool {
    HEADER_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

fn parse_line(line: &str) -> Option<Transaction> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    let [date, merchant, product, amount, incoming] = parts.as_slice() else {
        return None;
    };

    if date.is_empty() || *date == "DATE" || merchant.is_empty() {
        return None;
    }

    Some(Transaction {
        date: date.to_string(),
        merchant: merchant.to_string(),
        product: product.to_string(),
        amount: amount.to_string(),
        is_incoming: *incoming == "T",
    })
}

/// Keep transactions dated strictly after `today - days`
pub fn filter_recent(transactions: &[Transaction], days: i64, today: NaiveDate) -> Vec<Transaction> {
    let cutoff = today - Duration::days(days);
    transactions
        .iter()
        .filter(|tx| tx.parsed_date().is_some_and(|date| date > cutoff))
        .cloned()
        .collect()
}

/// Parse `$1,234.50` style amounts; malformed input yields `0.0`
pub fn parse_amount(amount: &str) -> f64 {
    let cleaned: String = amount
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().unwrap_or(0.0)
}

/// Convert to the HTTP representation; debits carry a negated amount
pub fn to_api(transactions: &[Transaction]) -> Vec<ApiTransaction> {
    transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            let amount = tx.amount_value();
            ApiTransaction {
                id: format!("tx-{}", i + 1),
                amount: if tx.is_incoming { amount } else { -amount },
                description: tx.product.clone(),
                date: tx.date.clone(),
                merchant: tx.merchant.clone(),
                is_incoming: tx.is_incoming,
                kind: if tx.is_incoming { "credit" } else { "debit" }.to_string(),
            }
        })
        .collect()
}

/// The `TOTAL TRANSACTIONS:` .. `TOTAL AMOUNT:` block of the feed, verbatim
pub fn extract_summary(content: &str) -> String {
    let mut summary = String::new();
    let mut in_summary = false;

    for line in content.lines() {
        if line.contains("TOTAL TRANSACTIONS:") || line.contains("TOTAL AMOUNT:") {
            in_summary = true;
        }
        if in_summary {
            summary.push_str(line);
            summary.push('\n');
            if line.contains("TOTAL AMOUNT:") {
                break;
            }
        }
    }

    summary
}

/// `- Category: $amount` lines under `CATEGORY BREAKDOWN:`
pub fn extract_categories(content: &str) -> BTreeMap<String, String> {
    let mut categories = BTreeMap::new();
    let mut in_section = false;

    for line in content.lines() {
        if line.contains("CATEGORY BREAKDOWN:") {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some(entry) = line.strip_prefix("- ") {
            if let Some((name, amount)) = entry.split_once(':') {
                categories.insert(name.trim().to_string(), amount.trim().to_string());
            }
        }
    }

    categories
}
