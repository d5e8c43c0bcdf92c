//! Echo Tool

use crate::mcp::McpToolResult;
use crate::server::tool::{parse_input, ServerTool};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use toolrelay_foundation::Result;

#[derive(Debug, Deserialize)]
struct EchoInput {
    text: String,
}

pub struct EchoTool;

impl EchoTool {
    pub const NAME: &'static str = "echo";
}

#[async_trait]
impl ServerTool for EchoTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn doc(&self) -> Option<&str> {
        Some("Simple echo tool that returns the input text.\n\ntext: The text message to echo back")
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "The text message to echo back"}
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, input: Value) -> Result<McpToolResult> {
        let input: EchoInput = parse_input(Self::NAME, input)?;
        Ok(McpToolResult::text(format!("Echo: {}", input.text)))
    }
}
