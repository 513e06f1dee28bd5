//! # finai Core - AI shopping assistant backend
//!
//! Core types, traits, and services for the finai backend.
//!
//! This crate provides:
//! - Tool system (`tool`) - Callable tools exposed to the agent server
//! - Transaction feed (`transactions`) - Mock credit card history parsing
//! - Alert board (`alerts`) - Capped in-memory notifications
//! - Banking executor (`banking`) - Seam to the external banking service
//! - Provider trait (`provider`) - LLM completion seam
//! - Background analysis (`analysis`) - Polling loops over the feed

#![warn(missing_docs)]

pub mod alerts;
pub mod analysis;
pub mod banking;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod provider;
pub mod tool;
pub mod transactions;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::alerts::{Alert, AlertBoard, AlertKind};
    pub use crate::analysis::{
        AnalysisManager, LargeTransactionMonitor, Poller, ProductAlternativeScout,
        RecurringPayment, RecurringPaymentDetector, RecurringStore, Tick,
    };
    pub use crate::banking::{BankingExecutor, ExecuteRequest, ExecuteResponse, HttpBankingExecutor};
    pub use crate::config::{AlertConfig, AnalysisConfig, Config};
    pub use crate::error::{Error, Result};
    pub use crate::message::{Message, Role};
    pub use crate::provider::{CompletionRequest, Provider};
    pub use crate::tool::{Tool, ToolContext, ToolDefinition, ToolResult, ToolSet, ToolSetBuilder};
    pub use crate::transactions::{ApiTransaction, Transaction, TransactionFeed};
}
