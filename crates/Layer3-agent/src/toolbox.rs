//! Toolbox - the agent's view of the tools it can call
//!
//! - `McpToolbox`: tools of a server process, through `McpClient`
//! - `LocalToolbox`: a `ToolRegistry` run in-process
//!
//! Both turn every outcome into text, so the loop can feed it straight
//! back to the model.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use toolrelay_core::{render_tool_result, McpClient, McpTool, ToolRegistry};
use toolrelay_foundation::{Error, Result, ServerConfig};
use tracing::{debug, warn};

#[async_trait]
pub trait Toolbox: Send + Sync {
    async fn available_tools(&self) -> BTreeMap<String, McpTool>;

    async fn contains(&self, name: &str) -> bool {
        self.available_tools().await.contains_key(name)
    }

    /// Run a tool with the model's raw argument text
    async fn invoke(&self, name: &str, raw_input: &str) -> String;

    /// Release resources; safe to call more than once
    async fn cleanup(&self) -> Result<()>;
}

/// Raw action text to a JSON arguments object
fn parse_arguments(name: &str, raw_input: &str) -> std::result::Result<Value, String> {
    match serde_json::from_str::<Value>(raw_input) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!(
            "Invalid tool input for '{}': expected a JSON object, got {}",
            name, other
        )),
        Err(e) => Err(format!("Invalid tool input for '{}': {}", name, e)),
    }
}

// ============================================================================
// McpToolbox
// ============================================================================

/// Tools served by a child process
pub struct McpToolbox {
    client: McpClient,
}

impl McpToolbox {
    pub fn new(client: McpClient) -> Self {
        Self { client }
    }

    /// Launch the server and connect
    ///
    /// A half-started server is stopped before the error is returned.
    pub async fn connect(config: &ServerConfig) -> Result<Self> {
        let client = McpClient::new();
        if let Err(e) = client.connect(config).await {
            if let Err(cleanup_err) = client.cleanup().await {
                warn!("Cleanup after failed connect also failed: {}", cleanup_err);
            }
            return Err(e);
        }
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &McpClient {
        &self.client
    }
}

#[async_trait]
impl Toolbox for McpToolbox {
    async fn available_tools(&self) -> BTreeMap<String, McpTool> {
        self.client.available_tools().await
    }

    async fn invoke(&self, name: &str, raw_input: &str) -> String {
        match parse_arguments(name, raw_input) {
            Ok(arguments) => self.client.call_tool(name, arguments).await,
            Err(message) => {
                debug!("{}", message);
                message
            }
        }
    }

    async fn cleanup(&self) -> Result<()> {
        self.client.cleanup().await
    }
}

// ============================================================================
// LocalToolbox
// ============================================================================

/// Tools run in-process
pub struct LocalToolbox {
    registry: ToolRegistry,
    closed: AtomicBool,
}

impl LocalToolbox {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_builtins() -> Self {
        Self::new(ToolRegistry::with_builtins())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Toolbox for LocalToolbox {
    async fn available_tools(&self) -> BTreeMap<String, McpTool> {
        self.registry
            .descriptors()
            .into_iter()
            .map(|tool| (tool.name.clone(), tool))
            .collect()
    }

    async fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    async fn invoke(&self, name: &str, raw_input: &str) -> String {
        let arguments = match parse_arguments(name, raw_input) {
            Ok(arguments) => arguments,
            Err(message) => return message,
        };

        match self.registry.call(name, &arguments).await {
            Ok(result) => render_tool_result(&result.to_value()),
            Err(Error::ToolNotFound(_)) => format!(
                "Error: Unknown tool '{}'. Available tools: {:?}",
                name,
                self.registry.names()
            ),
            Err(Error::ToolExecution { message, .. }) => {
                format!("Tool execution error: {}", message)
            }
            Err(other) => format!("Tool execution failed: {}", other),
        }
    }

    async fn cleanup(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
