//! finai - shopping assistant backend server
//!
//! Serves the alert board, the mock transaction feed and the tool surface,
//! and runs the background analysis loops.

mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use finai_core::alerts::AlertBoard;
use finai_core::analysis::{
    AnalysisManager, LargeTransactionMonitor, ProductAlternativeScout, RecurringPaymentDetector,
    RecurringStore,
};
use finai_core::banking::{BankingExecutor, HttpBankingExecutor};
use finai_core::config::Config;
use finai_core::logging::init_logging;
use finai_core::provider::Provider;
use finai_core::tool::{
    AnalyzeProductsTool, AnalyzeSpendingTool, BankingTool, PostAlertTool, ReadAlertsTool,
    ReadMockTransactionsTool, SearchProductAlternativesTool, ToolSet, ToolSetBuilder,
};
use finai_core::transactions::TransactionFeed;
use finai_providers::anthropic::Anthropic;

use state::AppState;

/// finai server CLI
#[derive(Parser, Debug)]
#[command(name = "finai")]
#[command(about = "AI shopping assistant backend", long_about = None)]
struct Args {
    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Directory for rotated log files
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    log_dir: String,
}

fn build_tools(
    config: &Config,
    board: &Arc<AlertBoard>,
    feed: &TransactionFeed,
    provider: &Arc<dyn Provider>,
    executor: &Arc<dyn BankingExecutor>,
) -> ToolSet {
    ToolSetBuilder::new()
        .tool(ReadMockTransactionsTool::new(feed.clone()))
        .tool(SearchProductAlternativesTool::new(provider.clone(), &config.model))
        .tool(PostAlertTool::new(board.clone()))
        .tool(ReadAlertsTool::new(board.clone()))
        .tool(AnalyzeSpendingTool::new(executor.clone()))
        .tool(AnalyzeProductsTool::new(
            executor.clone(),
            provider.clone(),
            &config.model,
        ))
        .shared_tools(BankingTool::catalog(executor.clone()))
        .build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_dir, "finai.log", &args.log_level)?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    info!("Starting finai server");
    info!("Model: {}", config.model);
    info!("Banking API: {}", config.liminal_base_url);
    info!("Mock transactions: {}", config.mock_transactions_file.display());

    let provider: Arc<dyn Provider> = Arc::new(Anthropic::new(&config.anthropic_key)?);
    let executor: Arc<dyn BankingExecutor> =
        Arc::new(HttpBankingExecutor::new(&config.liminal_base_url)?);
    let feed = TransactionFeed::new(&config.mock_transactions_file);
    let board = Arc::new(AlertBoard::new(config.alerts.capacity));
    let recurring = Arc::new(RecurringStore::new());

    let tools = build_tools(&config, &board, &feed, &provider, &executor);
    info!("Registered {} tools", tools.len());

    let mut analysis = AnalysisManager::new(&config.analysis);
    analysis.start(Arc::new(ProductAlternativeScout::new(
        feed.clone(),
        provider.clone(),
        board.clone(),
        &config.model,
        config.analysis.clone(),
    )));
    analysis.start(Arc::new(LargeTransactionMonitor::new(
        feed.clone(),
        provider.clone(),
        board.clone(),
        &config.model,
        config.analysis.clone(),
    )));
    analysis.start(Arc::new(RecurringPaymentDetector::new(
        feed.clone(),
        provider.clone(),
        recurring.clone(),
        &config.model,
        config.analysis.clone(),
    )));

    let state = Arc::new(AppState {
        board,
        feed,
        recurring,
        tools,
        alert_retention_hours: config.alerts.retention_hours,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("HTTP server listening on http://{}", addr);
    info!("Press Ctrl+C to stop...");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    analysis.shutdown().await;
    info!("finai server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received");
}
