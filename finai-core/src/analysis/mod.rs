//! Background analysis loops
//!
//! Each loop is a [`Poller`]: one call to [`Poller::tick`] looks at the
//! transaction feed, claims the first item it has not checked yet and makes
//! at most one model call about it. When every item has been checked the
//! poller clears its [`CheckedSet`] and reports [`Tick::Exhausted`], and the
//! [`AnalysisManager`] waits for the poller's reset delay before ticking it
//! again. Failures are logged and the item stays checked; there are no
//! retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::Result;

pub mod alternatives;
pub mod large_transactions;
pub mod recurring;
pub mod tracker;

pub use alternatives::ProductAlternativeScout;
pub use large_transactions::LargeTransactionMonitor;
pub use recurring::{RecurringPayment, RecurringPaymentDetector, RecurringStore};
pub use tracker::CheckedSet;

/// Outcome of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to look at
    Idle,
    /// One item was claimed and analyzed
    Processed,
    /// Every item was already checked; the set has been reset
    Exhausted,
}

/// A background loop body
#[async_trait]
pub trait Poller: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Run one poll
    async fn tick(&self) -> Result<Tick>;

    /// Pause after [`Tick::Exhausted`]
    fn reset_delay(&self) -> Duration;
}

/// Calendar date the lookback window is measured from
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Manager for the background analysis tasks
pub struct AnalysisManager {
    initial_delay: Duration,
    interval: Duration,
    tasks: Vec<JoinHandle<()>>,
}

impl AnalysisManager {
    /// Create a manager using the loop timing from `config`
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            initial_delay: config.initial_delay,
            interval: config.interval,
            tasks: Vec::new(),
        }
    }

    /// Spawn a poller on its own task
    pub fn start(&mut self, poller: Arc<dyn Poller>) {
        let initial_delay = self.initial_delay;
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let name = poller.name();
            info!(poller = name, "Starting analysis loop");
            tokio::time::sleep(initial_delay).await;

            loop {
                match poller.tick().await {
                    Ok(Tick::Exhausted) => {
                        info!(poller = name, "All items checked, resetting");
                        tokio::time::sleep(poller.reset_delay()).await;
                    }
                    Ok(tick) => debug!(poller = name, ?tick, "Tick complete"),
                    Err(e) => warn!(poller = name, "Tick failed: {}", e),
                }
                tokio::time::sleep(interval).await;
            }
        });
        self.tasks.push(handle);
    }

    /// Number of running loops
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if no loop was started
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Shutdown all background tasks
    pub async fn shutdown(self) {
        info!("Shutting down {} analysis loops", self.tasks.len());
        for task in self.tasks {
            task.abort();
        }
        info!("All analysis loops stopped");
    }
}
