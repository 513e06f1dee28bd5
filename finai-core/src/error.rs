//! Error types for the finai backend

use thiserror::Error;

/// Result type alias using finai's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the finai backend
#[derive(Debug, Error)]
pub enum Error {
    // ============ Configuration Errors ============
    /// Required configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    // ============ Provider Errors ============
    /// Provider API error
    #[error("Provider API error: {0}")]
    ProviderApi(String),

    /// Provider authentication failed
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider did not answer before the deadline
    #[error("Provider timeout after {timeout_secs}s")]
    ProviderTimeout {
        /// Timeout duration in seconds
        timeout_secs: u64,
    },

    // ============ Tool Errors ============
    /// Tool not found in the toolset
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Tool execution error: {tool_name} - {message}")]
    ToolExecution {
        /// Name of the tool that failed
        tool_name: String,
        /// Error message
        message: String,
    },

    /// Invalid tool arguments
    #[error("Invalid tool arguments for {tool_name}: {message}")]
    ToolArguments {
        /// Name of the tool
        tool_name: String,
        /// Error message
        message: String,
    },

    // ============ Data Errors ============
    /// The mock transaction feed could not be read
    #[error("Transaction feed error: {0}")]
    TransactionFeed(String),

    /// A model reply did not have the expected shape
    #[error("Response parse error: {0}")]
    ResponseParse(String),

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    // ============ Banking Errors ============
    /// Banking executor rejected or failed a request
    #[error("Banking executor error: {0}")]
    Banking(String),

    // ============ Network Errors ============
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ============ System Errors ============
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============ Generic Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new tool execution error
    pub fn tool_execution(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create a new tool arguments error
    pub fn tool_arguments(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolArguments {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the LLM provider side
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            Self::ProviderApi(_) | Self::ProviderAuth(_) | Self::ProviderTimeout { .. }
        )
    }
}
