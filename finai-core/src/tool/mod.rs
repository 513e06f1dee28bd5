//! Tool system for the agent runtime
//!
//! A tool is a named, schema-described callable. The agent server discovers
//! tools through [`ToolSet::definitions`] and runs them through
//! [`ToolSet::invoke`], which always answers with a [`ToolResult`] envelope.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::banking::ExecuteRequest;
use crate::error::{Error, Result};

pub mod alerts;
pub mod banking;
pub mod products;
pub mod spending;
pub mod transactions;

pub use alerts::{PostAlertTool, ReadAlertsTool};
pub use banking::BankingTool;
pub use products::{AnalyzeProductsTool, SearchProductAlternativesTool};
pub use spending::AnalyzeSpendingTool;
pub use transactions::ReadMockTransactionsTool;

/// Definition of a tool that can be sent to the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// Description for the LLM
    pub description: String,
    /// JSON Schema for parameters
    pub parameters: serde_json::Value,
    /// Moves money; the caller must confirm before it runs
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_confirmation: bool,
}

/// Per-call context supplied by the agent server
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Authenticated user
    pub user_id: String,
    /// Correlation id of the call
    pub request_id: String,
    /// Bearer token forwarded to the banking executor
    pub auth_token: Option<String>,
}

impl ToolContext {
    /// Build a banking executor request for this caller
    pub fn execute_request(&self, tool: &str, input: serde_json::Value) -> ExecuteRequest {
        ExecuteRequest {
            user_id: self.user_id.clone(),
            tool: tool.to_string(),
            input,
            request_id: self.request_id.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}

/// `{success, data|error}` envelope returned to the agent server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool succeeded
    pub success: bool,
    /// Tool output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Successful result
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed result
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Trait for implementing tools that AI agents can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// The name of this tool
    fn name(&self) -> String;

    /// Get the tool definition for the LLM
    async fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments (JSON string)
    async fn call(&self, ctx: &ToolContext, arguments: &str) -> anyhow::Result<serde_json::Value>;
}

/// JSON schema of a typed argument struct, without the root metadata keys
pub fn parameters_schema<T: JsonSchema>() -> serde_json::Value {
    let mut value = serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    value
}

/// Deserialize tool arguments; blank input counts as `{}`
pub fn parse_args<T: DeserializeOwned>(tool_name: &str, arguments: &str) -> Result<T> {
    let raw = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(raw)
        .map_err(|e| Error::tool_arguments(tool_name, format!("invalid input: {}", e)))
}

/// A collection of tools available to the agent
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolSet {
    /// Create an empty toolset
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool to the set
    pub fn add<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        self.tools.insert(tool.name(), Arc::new(tool));
        self
    }

    /// Add a shared tool to the set
    pub fn add_shared(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        self.tools.insert(tool.name(), tool);
        self
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool definitions, sorted by name
    pub async fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs = Vec::with_capacity(self.tools.len());
        for tool in self.tools.values() {
            defs.push(tool.definition().await);
        }
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Call a tool by name
    pub async fn call(
        &self,
        ctx: &ToolContext,
        name: &str,
        arguments: &str,
    ) -> anyhow::Result<serde_json::Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        tool.call(ctx, arguments).await
    }

    /// Call a tool and fold the outcome into the result envelope
    pub async fn invoke(&self, ctx: &ToolContext, name: &str, arguments: &str) -> ToolResult {
        debug!(tool = name, request_id = %ctx.request_id, "Invoking tool");
        match self.call(ctx, name, arguments).await {
            Ok(data) => ToolResult::ok(data),
            Err(e) => {
                warn!(tool = name, "Tool failed: {}", e);
                ToolResult::err(e.to_string())
            }
        }
    }

    /// Get the number of tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builder for creating a ToolSet
#[derive(Default)]
pub struct ToolSetBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSetBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Add several shared tools
    pub fn shared_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Build the ToolSet
    pub fn build(self) -> ToolSet {
        let mut toolset = ToolSet::new();
        for tool in self.tools {
            toolset.add_shared(tool);
        }
        toolset
    }
}
