//! Alert board shared by the pollers, the alert tools and the HTTP handlers
//!
//! Append-only and capped: once `capacity` is reached, each new alert evicts
//! the oldest one.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Severity tag of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// General insight
    #[default]
    Info,
    /// Concern or caution
    Warning,
    /// Positive news, savings found
    Success,
}

impl AlertKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Info => "info",
            AlertKind::Warning => "warning",
            AlertKind::Success => "success",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AlertKind::Info),
            "warning" => Ok(AlertKind::Warning),
            "success" => Ok(AlertKind::Success),
            other => Err(format!("unknown alert type: {}", other)),
        }
    }
}

/// A timestamped user-facing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique id, `<prefix>-<unix nanos>`
    pub id: String,
    /// Text shown to the user
    pub message: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Severity tag
    #[serde(rename = "type")]
    pub kind: AlertKind,
}

impl Alert {
    /// Create an alert stamped with the current time
    pub fn new(prefix: &str, message: impl Into<String>, kind: AlertKind) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!(
                "{}-{}",
                prefix,
                timestamp.timestamp_nanos_opt().unwrap_or_default()
            ),
            message: message.into(),
            timestamp,
            kind,
        }
    }

    /// Age in fractional hours relative to `now`
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.timestamp).num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Capped, concurrently shared alert list
pub struct AlertBoard {
    capacity: usize,
    alerts: RwLock<VecDeque<Alert>>,
}

impl AlertBoard {
    /// Create an empty board holding at most `capacity` alerts
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            alerts: RwLock::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    /// Append an alert, evicting the oldest entries beyond capacity
    pub fn post(&self, alert: Alert) {
        let mut alerts = self.alerts.write();
        alerts.push_back(alert);
        while alerts.len() > self.capacity {
            alerts.pop_front();
        }
    }

    /// Alerts newer than `hours` ago, oldest first
    pub fn recent(&self, hours: i64) -> Vec<Alert> {
        self.recent_at(hours, Utc::now())
    }

    /// Alerts with a timestamp strictly after `now - hours`
    ///
    /// A window too large to represent has no cutoff and returns every alert.
    pub fn recent_at(&self, hours: i64, now: DateTime<Utc>) -> Vec<Alert> {
        let cutoff = Duration::try_hours(hours).and_then(|window| now.checked_sub_signed(window));
        self.alerts
            .read()
            .iter()
            .filter(|alert| cutoff.map_or(true, |cutoff| alert.timestamp > cutoff))
            .cloned()
            .collect()
    }

    /// Copy of every stored alert
    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.read().iter().cloned().collect()
    }

    /// Number of stored alerts
    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new(100)
    }
}
