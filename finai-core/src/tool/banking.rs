//! Banking operations proxied to the executor

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolContext, ToolDefinition};
use crate::banking::BankingExecutor;
use crate::error::Error;

struct Operation {
    name: &'static str,
    description: &'static str,
    parameters: fn() -> Value,
    requires_confirmation: bool,
}

fn no_parameters() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn search_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": "Name, username or email to search for" }
        },
        "required": ["query"]
    })
}

fn send_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "recipient": { "type": "string", "description": "Username or user id of the recipient" },
            "amount": { "type": "string", "description": "Amount to send (e.g., '25.00')" },
            "currency": { "type": "string", "description": "Currency code (default: USD)" },
            "memo": { "type": "string", "description": "Optional note for the recipient" }
        },
        "required": ["recipient", "amount"]
    })
}

fn savings_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "amount": { "type": "string", "description": "Amount to move" },
            "currency": { "type": "string", "description": "Currency code (default: USD)" }
        },
        "required": ["amount"]
    })
}

static OPERATIONS: &[Operation] = &[
    Operation {
        name: "get_balance",
        description: "Get the user's current wallet balance across currencies.",
        parameters: no_parameters,
        requires_confirmation: false,
    },
    Operation {
        name: "get_savings_balance",
        description: "Get the user's savings vault balance and accrued interest.",
        parameters: no_parameters,
        requires_confirmation: false,
    },
    Operation {
        name: "get_vault_rates",
        description: "Get the current interest rates offered by the savings vaults.",
        parameters: no_parameters,
        requires_confirmation: false,
    },
    Operation {
        name: "get_profile",
        description: "Get the user's profile: name, username and account details.",
        parameters: no_parameters,
        requires_confirmation: false,
    },
    Operation {
        name: "search_users",
        description: "Search for other users to send money to.",
        parameters: search_parameters,
        requires_confirmation: false,
    },
    Operation {
        name: "send_money",
        description: "Send money to another user. Moves funds and needs the user's confirmation.",
        parameters: send_parameters,
        requires_confirmation: true,
    },
    Operation {
        name: "deposit_savings",
        description: "Deposit funds from the wallet into savings. Needs the user's confirmation.",
        parameters: savings_parameters,
        requires_confirmation: true,
    },
    Operation {
        name: "withdraw_savings",
        description: "Withdraw funds from savings into the wallet. Needs the user's confirmation.",
        parameters: savings_parameters,
        requires_confirmation: true,
    },
];

/// One banking operation forwarded as-is to the executor
pub struct BankingTool {
    operation: &'static Operation,
    executor: Arc<dyn BankingExecutor>,
}

impl BankingTool {
    /// Every banking operation, sharing one executor
    pub fn catalog(executor: Arc<dyn BankingExecutor>) -> Vec<Arc<dyn Tool>> {
        OPERATIONS
            .iter()
            .map(|operation| {
                Arc::new(Self {
                    operation,
                    executor: executor.clone(),
                }) as Arc<dyn Tool>
            })
            .collect()
    }
}

#[async_trait]
impl Tool for BankingTool {
    fn name(&self) -> String {
        self.operation.name.to_string()
    }

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.operation.description.to_string(),
            parameters: (self.operation.parameters)(),
            requires_confirmation: self.operation.requires_confirmation,
        }
    }

    async fn call(&self, ctx: &ToolContext, arguments: &str) -> anyhow::Result<Value> {
        let name = self.operation.name;
        let input: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments)
                .map_err(|e| Error::tool_arguments(name, format!("invalid input: {}", e)))?
        };

        let response = self.executor.execute(ctx.execute_request(name, input)).await?;
        if !response.success {
            return Err(Error::tool_execution(
                name,
                response.error.unwrap_or_else(|| "operation failed".to_string()),
            )
            .into());
        }

        Ok(response.data)
    }
}
