//! Menu tool - shows the main menu, resetting the user's dialog if one is named

use super::{parse_input, Tool, ToolContext, ToolOutput};
use crate::state_machine::MAIN_MENU;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct MenuTool;

#[derive(Debug, Default, Deserialize)]
struct MenuInput {
    #[serde(default)]
    user_id: Option<String>,
}

#[async_trait]
impl Tool for MenuTool {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn description(&self) -> String {
        "Show the main service menu. When a user_id is given, that user's dialog restarts from the menu.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {
                    "type": "string",
                    "description": "User whose dialog should be reset"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: MenuInput = if input.is_null() {
            MenuInput::default()
        } else {
            match parse_input(input) {
                Ok(input) => input,
                Err(output) => return output,
            }
        };

        match input.user_id.as_deref().filter(|id| !id.is_empty()) {
            Some(user_id) => ToolOutput::success(ctx.runtime.reset(user_id).await),
            None => ToolOutput::success(MAIN_MENU),
        }
    }
}
