//! Demo tools: `add` and `greet`

use crate::mcp::McpToolResult;
use crate::server::tool::{parse_input, ServerTool};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use toolrelay_foundation::{Error, Result};

#[derive(Debug, Deserialize)]
struct AddInput {
    a: i64,
    b: i64,
}

pub struct AddTool;

impl AddTool {
    pub const NAME: &'static str = "add";
}

#[async_trait]
impl ServerTool for AddTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn doc(&self) -> Option<&str> {
        Some("Add two numbers")
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": {"type": "integer"},
                "b": {"type": "integer"}
            },
            "required": ["a", "b"]
        })
    }

    async fn execute(&self, input: Value) -> Result<McpToolResult> {
        let input: AddInput = parse_input(Self::NAME, input)?;
        let sum = input
            .a
            .checked_add(input.b)
            .ok_or_else(|| Error::tool_execution(Self::NAME, "integer overflow"))?;
        Ok(McpToolResult::text(sum.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GreetInput {
    name: String,
}

pub struct GreetTool;

impl GreetTool {
    pub const NAME: &'static str = "greet";
}

#[async_trait]
impl ServerTool for GreetTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn doc(&self) -> Option<&str> {
        Some("Greet a person by name")
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"}
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, input: Value) -> Result<McpToolResult> {
        let input: GreetInput = parse_input(Self::NAME, input)?;
        Ok(McpToolResult::text(format!("Hello {}!", input.name)))
    }
}
