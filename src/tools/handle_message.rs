//! Handle message tool - feeds a user's chat message into their dialog

use super::{parse_input, Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct HandleMessageTool;

#[derive(Debug, Deserialize)]
struct HandleMessageInput {
    message: String,
    user_id: String,
}

#[async_trait]
impl Tool for HandleMessageTool {
    fn name(&self) -> &'static str {
        "handle_message"
    }

    fn description(&self) -> String {
        "Pass a user's chat message to their dialog and return the reply to show them. Dialogs offer UPI payment links, text/PDF conversion and Google Lens image search.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["message", "user_id"],
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The user's message, verbatim"
                },
                "user_id": {
                    "type": "string",
                    "description": "Stable identifier of the user"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: HandleMessageInput = match parse_input(input) {
            Ok(input) => input,
            Err(output) => return output,
        };
        if input.user_id.is_empty() {
            return ToolOutput::error("Invalid input: user_id must not be empty");
        }
        ToolOutput::success(
            ctx.runtime
                .handle_message(&input.user_id, &input.message)
                .await,
        )
    }
}
