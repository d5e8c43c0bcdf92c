//! Tool Registry - name → tool, in registration order
//!
//! Populated once at startup and read-only afterwards.
//!
//! ```ignore
//! let registry = ToolRegistry::with_builtins();
//! let result = registry.call("echo", &json!({"text": "hi"})).await?;
//! ```

use super::builtin;
use super::schema;
use super::tool::ServerTool;
use crate::mcp::{McpTool, McpToolResult};
use serde_json::Value;
use std::sync::Arc;
use toolrelay_foundation::{Error, Result};
use tracing::debug;

/// Tool registry
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ServerTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for tool in builtin::all_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool; a tool with the same name is replaced in place
    pub fn register(&mut self, tool: Arc<dyn ServerTool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ServerTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors for `tools/list`
    pub fn descriptors(&self) -> Vec<McpTool> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    /// Validate `arguments` and run the tool
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<McpToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        schema::validate(&tool.schema(), arguments)
            .map_err(|message| Error::tool_execution(name, message))?;

        debug!("Executing tool {}", name);
        tool.execute(arguments.clone()).await.map_err(|e| match e {
            Error::ToolExecution { .. } => e,
            other => Error::tool_execution(name, other.to_string()),
        })
    }
}
