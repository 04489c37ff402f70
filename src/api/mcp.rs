//! JSON-RPC tool endpoint
//!
//! Speaks the subset of the Model Context Protocol a chat host needs to list
//! and call tools: `initialize`, `ping`, `tools/list` and `tools/call`.

use super::types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use super::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

pub async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let error = JsonRpcError::new(PARSE_ERROR, format!("Parse error: {e}"));
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(Value::Null, error)),
            )
                .into_response();
        }
    };

    let Some(id) = request.id.clone() else {
        tracing::debug!(method = %request.method, "Notification received");
        return StatusCode::ACCEPTED.into_response();
    };

    if request.jsonrpc != "2.0" {
        let error = JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\"");
        return Json(JsonRpcResponse::error(id, error)).into_response();
    }

    let response = match dispatch(&state, request).await {
        Ok(result) => JsonRpcResponse::result(id, result),
        Err(error) => JsonRpcResponse::error(id, error),
    };
    Json(response).into_response()
}

async fn dispatch(state: &AppState, request: JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => {
            let version = request
                .params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);
            Ok(json!({
                "protocolVersion": version,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }
            }))
        }
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": state.tools.definitions() })),
        "tools/call" => {
            let params: ToolCallParams = serde_json::from_value(request.params)
                .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {e}")))?;
            let output = state
                .tools
                .execute(&params.name, params.arguments, state.tool_context())
                .await
                .ok_or_else(|| {
                    JsonRpcError::new(INVALID_PARAMS, format!("Unknown tool: {}", params.name))
                })?;
            tracing::info!(tool = %params.name, success = output.success, "Tool call completed");
            Ok(json!({
                "content": [{ "type": "text", "text": output.output }],
                "isError": !output.success,
            }))
        }
        other => Err(JsonRpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        )),
    }
}
