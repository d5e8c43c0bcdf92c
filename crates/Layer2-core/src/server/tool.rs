//! Server-side tool interface

use crate::mcp::{McpTool, McpToolResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use toolrelay_foundation::{Error, Result};

/// A tool the server can execute
///
/// Arguments are checked against `schema()` by the registry before
/// `execute` runs.
#[async_trait]
pub trait ServerTool: Send + Sync {
    /// Unique tool name
    fn name(&self) -> &str;

    /// Free-form documentation; its first line is the advertised description
    fn doc(&self) -> Option<&str> {
        None
    }

    /// JSON Schema of the arguments object
    fn schema(&self) -> Value;

    async fn execute(&self, input: Value) -> Result<McpToolResult>;

    /// Descriptor sent in `tools/list`
    fn descriptor(&self) -> McpTool {
        let description = match self.doc() {
            Some(doc) => doc.lines().next().unwrap_or("").trim().to_string(),
            None => format!("Tool: {}", self.name()),
        };
        McpTool::new(self.name(), description, self.schema())
    }
}

/// Deserialize tool input into its typed form
pub fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| Error::tool_execution(tool, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Documented(Option<&'static str>);

    #[async_trait]
    impl ServerTool for Documented {
        fn name(&self) -> &str {
            "documented"
        }

        fn doc(&self) -> Option<&str> {
            self.0
        }

        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value) -> Result<McpToolResult> {
            Ok(McpToolResult::text("ok"))
        }
    }

    #[test]
    fn test_description_is_first_doc_line() {
        let tool = Documented(Some("  Does a thing.  \n\n  More detail here."));
        assert_eq!(tool.descriptor().description, "Does a thing.");
    }

    #[test]
    fn test_description_fallback() {
        let tool = Documented(None);
        assert_eq!(tool.descriptor().description, "Tool: documented");
    }
}
