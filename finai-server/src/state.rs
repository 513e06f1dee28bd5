//! Shared handler state

use std::sync::Arc;

use finai_core::alerts::AlertBoard;
use finai_core::analysis::RecurringStore;
use finai_core::tool::ToolSet;
use finai_core::transactions::TransactionFeed;

/// Everything the HTTP handlers read from
pub struct AppState {
    /// Alerts posted by pollers and tools
    pub board: Arc<AlertBoard>,
    /// Mock transaction feed
    pub feed: TransactionFeed,
    /// Latest recurring-payment detection
    pub recurring: Arc<RecurringStore>,
    /// Tools callable through the tool routes
    pub tools: ToolSet,
    /// Age, in hours, of the oldest alert still served
    pub alert_retention_hours: i64,
}

/// State handle shared by all handlers
pub type SharedState = Arc<AppState>;
