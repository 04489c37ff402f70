//! Validate tool - lets the host confirm which number owns this server

use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct ValidateTool;

#[async_trait]
impl Tool for ValidateTool {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> String {
        "Return the phone number of the server owner.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn run(&self, _input: Value, ctx: ToolContext) -> ToolOutput {
        ToolOutput::success(ctx.phone_number.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::test_context;

    #[tokio::test]
    async fn test_validate_returns_number() {
        let result = ValidateTool.run(json!({}), test_context()).await;
        assert!(result.success);
        assert_eq!(result.output, "919876543210");
    }
}
