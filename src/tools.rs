//! Tools exposed to the chat host
//!
//! Tools are stateless singletons; everything a call needs arrives in its
//! `ToolContext`.

mod handle_message;
mod menu;
mod server_message;
mod validate;

pub use handle_message::HandleMessageTool;
pub use menu::MenuTool;
pub use server_message::ServerMessageTool;
pub use validate::ValidateTool;

use crate::runtime::ConversationRuntime;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Result from tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Tool metadata as advertised to the host
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// All context needed for a tool invocation
#[derive(Clone)]
pub struct ToolContext {
    pub runtime: Arc<ConversationRuntime>,
    /// Number the `validate` tool reports back to the host
    pub phone_number: Arc<str>,
}

impl ToolContext {
    pub fn new(runtime: Arc<ConversationRuntime>, phone_number: impl Into<Arc<str>>) -> Self {
        Self {
            runtime,
            phone_number: phone_number.into(),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput;
}

/// Parse a tool's arguments, mapping failures to an error output
fn parse_input<T: serde::de::DeserializeOwned>(input: Value) -> Result<T, ToolOutput> {
    serde_json::from_value(input).map_err(|e| ToolOutput::error(format!("Invalid input: {e}")))
}

pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn standard() -> Self {
        Self {
            tools: vec![
                Arc::new(ValidateTool),
                Arc::new(MenuTool),
                Arc::new(HandleMessageTool),
                Arc::new(ServerMessageTool),
            ],
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name; `None` if no tool has that name
    pub async fn execute(&self, name: &str, input: Value, ctx: ToolContext) -> Option<ToolOutput> {
        for tool in &self.tools {
            if tool.name() == name {
                tracing::debug!(tool = name, "Running tool");
                return Some(tool.run(input, ctx).await);
            }
        }
        None
    }
}
