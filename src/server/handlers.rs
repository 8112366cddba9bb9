//! Helpers shared by the server loop and the tools
//!
//! Argument extraction and the two content shapes a tool call can answer
//! with: a text result, or a rejection flagged with `isError`.

use serde::Serialize;
use serde_json::{json, Value};

use crate::protocol::{ToolError, ToolResult};

/// Extract tool arguments from params
pub fn extract_arguments(params: &Value) -> Value {
    params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
}

/// Extract tool name from params
pub fn extract_tool_name(params: &Value) -> Option<&str> {
    params.get("name").and_then(Value::as_str)
}

/// Build a text content response
pub fn text_response(text: String) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    })
}

/// Text content holding `value` as pretty JSON
pub fn json_response<T: Serialize + ?Sized>(value: &T) -> ToolResult<Value> {
    Ok(text_response(serde_json::to_string_pretty(value)?))
}

/// Build a rejection content response
pub fn error_response(code: &str, message: String) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": format!("Error: {}", message)
        }],
        "code": code,
        "isError": true
    })
}

/// A required positive integer argument
pub fn required_u64(params: &Value, key: &str) -> ToolResult<u64> {
    params
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| ToolError::InvalidParams(format!("missing or invalid '{}'", key)))
}

/// An optional positive integer argument
pub fn optional_usize(params: &Value, key: &str) -> ToolResult<Option<usize>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| ToolError::InvalidParams(format!("'{}' must be a non-negative integer", key))),
    }
}

/// A required non-empty string argument
pub fn required_str<'a>(params: &'a Value, key: &str) -> ToolResult<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidParams(format!("missing or invalid '{}'", key)))
}

pub fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}
