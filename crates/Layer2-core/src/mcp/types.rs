//! MCP Types - wire envelopes and tool descriptors

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// MCP protocol version
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC version tag
pub const JSONRPC_VERSION: &str = "2.0";

/// Error code used for every method and tool failure
pub const ERROR_CODE: i64 = -1;

// ============================================================================
// Envelopes
// ============================================================================

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default = "empty_object")]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 notification (no `id`, no response)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: None,
        }
    }
}

/// JSON-RPC 2.0 response
///
/// Exactly one of `result` / `error` is set by a well-behaved server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: ERROR_CODE,
                message: Some(message.into()),
                data: None,
            }),
        }
    }
}

/// JSON-RPC error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }
}

// ============================================================================
// Tools
// ============================================================================

/// Tool descriptor as exchanged during discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// JSON Schema of the arguments object
    #[serde(rename = "inputSchema", default = "empty_object")]
    pub input_schema: Value,
}

impl McpTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// One item of a `tools/call` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpContent {
    Text { text: String },
}

/// `tools/call` result payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolResult {
    pub content: Vec<McpContent>,
}

impl McpToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
        }
    }

    pub fn to_value(&self) -> Value {
        json!({ "content": self.content })
    }
}

/// Separator placed between text items; a literal backslash followed by `n`
pub const TEXT_SEPARATOR: &str = "\\n";

/// Text extraction from a `tools/call` result
///
/// - `content` array: every `type == "text"` item joined in order
/// - no text items: a placeholder
/// - no `content`: the JSON rendering of the result
pub fn render_tool_result(result: &Value) -> String {
    match result.get("content") {
        Some(content) => {
            let parts: Vec<&str> = content
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
                        .map(|item| item.get("text").and_then(Value::as_str).unwrap_or(""))
                        .collect()
                })
                .unwrap_or_default();

            if parts.is_empty() {
                "No text content returned".to_string()
            } else {
                parts.join(TEXT_SEPARATOR)
            }
        }
        None => result.to_string(),
    }
}

fn empty_object() -> Value {
    json!({})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new(7, "tools/list", json!({}));
        let line = serde_json::to_string(&req).unwrap();
        assert!(!line.contains('\n'));

        let parsed: JsonRpcRequest = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn test_notification_has_no_id() {
        let value = serde_json::to_value(JsonRpcNotification::new("notifications/initialized")).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["method"], "notifications/initialized");
    }

    #[test]
    fn test_descriptor_defaults() {
        let tool: McpTool = serde_json::from_value(json!({"name": "bare"})).unwrap();
        assert_eq!(tool.description, "");
        assert_eq!(tool.input_schema, json!({}));
    }

    #[test]
    fn test_render_tool_result() {
        let joined = render_tool_result(&json!({"content": [
            {"type": "text", "text": "a"},
            {"type": "image", "data": "..."},
            {"type": "text", "text": "b"}
        ]}));
        assert_eq!(joined, "a\\nb");

        let empty = render_tool_result(&json!({"content": []}));
        assert_eq!(empty, "No text content returned");

        let raw = render_tool_result(&json!({"value": 3}));
        assert_eq!(raw, r#"{"value":3}"#);
    }

    #[test]
    fn test_error_message_default() {
        let err: JsonRpcError = serde_json::from_value(json!({"code": 5})).unwrap();
        assert_eq!(err.message_or_default(), "Unknown error");
    }
}
