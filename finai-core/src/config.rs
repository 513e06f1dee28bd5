//! Application configuration
//!
//! Everything the process needs comes from environment variables (optionally
//! seeded from a `.env` file). Only `ANTHROPIC_API_KEY` is mandatory.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;
/// Default banking API base URL
pub const DEFAULT_LIMINAL_BASE_URL: &str = "https://api.liminal.cash";
/// Default model used by the pollers and AI-backed tools
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
/// Default location of the mock transaction feed
pub const DEFAULT_MOCK_TRANSACTIONS_FILE: &str = "data/mock_transactions.txt";

/// Process configuration resolved from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Anthropic API key
    pub anthropic_key: String,
    /// Base URL of the banking executor
    pub liminal_base_url: String,
    /// HTTP listen port
    pub port: u16,
    /// Path of the pipe-delimited mock transaction file
    pub mock_transactions_file: PathBuf,
    /// Model name sent to the provider
    pub model: String,
    /// Poller timing and thresholds
    pub analysis: AnalysisConfig,
    /// Alert board sizing
    pub alerts: AlertConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine; system variables still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_key = get("ANTHROPIC_API_KEY")
            .ok_or_else(|| Error::config("ANTHROPIC_API_KEY environment variable is required"))?;

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::config(format!("invalid PORT {:?}: {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            anthropic_key,
            liminal_base_url: get("LIMINAL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LIMINAL_BASE_URL.to_string()),
            port,
            mock_transactions_file: get("MOCK_TRANSACTIONS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MOCK_TRANSACTIONS_FILE)),
            model: get("CLAUDE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            analysis: AnalysisConfig::default(),
            alerts: AlertConfig::default(),
        })
    }
}

/// Timing and thresholds for the background analysis loops
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Delay before the first tick
    pub initial_delay: Duration,
    /// Pause between ticks
    pub interval: Duration,
    /// Pause after every item has been checked and the set is reset
    pub reset_delay: Duration,
    /// Deadline for a single model call
    pub ai_timeout: Duration,
    /// Minimum savings, in dollars, worth posting
    pub minimum_savings: f64,
    /// How far back purchases count as recent
    pub lookback_days: i64,
    /// Outgoing amount at or above which a transaction is "large"
    pub large_transaction_threshold: f64,
    /// Pause between recurring-payment detections
    pub recurring_reset_delay: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            interval: Duration::from_secs(5),
            reset_delay: Duration::from_secs(60),
            ai_timeout: Duration::from_secs(60),
            minimum_savings: 5.0,
            lookback_days: 7,
            large_transaction_threshold: 100.0,
            recurring_reset_delay: Duration::from_secs(300),
        }
    }
}

/// Alert board sizing
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Maximum number of alerts kept in memory
    pub capacity: usize,
    /// Age, in hours, after which alerts stop being exposed
    pub retention_hours: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            retention_hours: 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "sk-test")]))
            .expect("config should load");

        assert_eq!(config.anthropic_key, "sk-test");
        assert_eq!(config.liminal_base_url, DEFAULT_LIMINAL_BASE_URL);
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.mock_transactions_file,
            PathBuf::from("data/mock_transactions.txt")
        );
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.alerts.capacity, 100);
        assert_eq!(config.analysis.interval, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("LIMINAL_BASE_URL", "http://localhost:9000"),
            ("PORT", "3000"),
            ("MOCK_TRANSACTIONS_FILE", "/tmp/feed.txt"),
        ]))
        .expect("config should load");

        assert_eq!(config.liminal_base_url, "http://localhost:9000");
        assert_eq!(config.port, 3000);
        assert_eq!(config.mock_transactions_file, PathBuf::from("/tmp/feed.txt"));
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "3000")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        // Blank counts as missing
        let err = Config::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_port() {
        let err = Config::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
