//! Server message tool - host-issued control commands

use super::{parse_input, Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

const MENU_COMMAND: &str = "/mcp message server menu";

pub struct ServerMessageTool;

#[derive(Debug, Deserialize)]
struct ServerMessageInput {
    message: String,
    user_id: String,
}

#[async_trait]
impl Tool for ServerMessageTool {
    fn name(&self) -> &'static str {
        "server_message"
    }

    fn description(&self) -> String {
        format!("Handle a server command for a user. `{MENU_COMMAND}` returns the user to the main menu.")
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["message", "user_id"],
            "properties": {
                "message": { "type": "string" },
                "user_id": { "type": "string" }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: ServerMessageInput = match parse_input(input) {
            Ok(input) => input,
            Err(output) => return output,
        };
        if input.message.trim().eq_ignore_ascii_case(MENU_COMMAND) {
            return ToolOutput::success(ctx.runtime.reset(&input.user_id).await);
        }
        ToolOutput::success("Unrecognized server message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::MAIN_MENU;
    use crate::tools::testing::test_context;

    #[tokio::test]
    async fn test_menu_command_resets() {
        let ctx = test_context();
        ctx.runtime.handle_message("u1", "1").await;

        let result = ServerMessageTool
            .run(
                json!({"message": "  /MCP Message Server Menu ", "user_id": "u1"}),
                ctx.clone(),
            )
            .await;
        assert_eq!(result.output, MAIN_MENU);

        let reply = ctx.runtime.handle_message("u1", "2").await;
        assert!(reply.starts_with("You chose Text/Doc"));
    }

    #[tokio::test]
    async fn test_unrecognized() {
        let result = ServerMessageTool
            .run(json!({"message": "/mcp restart", "user_id": "u1"}), test_context())
            .await;
        assert!(result.success);
        assert_eq!(result.output, "Unrecognized server message");
    }
}
