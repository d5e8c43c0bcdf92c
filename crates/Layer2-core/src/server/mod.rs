//! MCP Server - serves a `ToolRegistry` over newline-delimited JSON-RPC
//!
//! Methods: `initialize`, `notifications/initialized` (silent),
//! `tools/list`, `tools/call`. Every failure is answered with code `-1`.
//!
//! stdout carries protocol lines only; diagnostics go through `tracing`,
//! which the server binary points at stderr.

mod registry;
mod schema;
mod tool;

pub mod builtin;

pub use registry::ToolRegistry;
pub use schema::validate;
pub use tool::{parse_input, ServerTool};

use crate::mcp::{JsonRpcResponse, MCP_PROTOCOL_VERSION};
use serde_json::{json, Value};
use toolrelay_foundation::{Error, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

/// Server identity reported by `initialize`
pub const SERVER_NAME: &str = "toolrelay-server";

/// MCP server
#[derive(Clone)]
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Server with every built-in tool
    pub fn with_builtins() -> Self {
        Self::new(ToolRegistry::with_builtins())
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answer one request; `None` for notifications that take no reply
    pub async fn handle_request(&self, request: &Value) -> Option<Value> {
        debug!("request: {}", request);

        let method = request.get("method").and_then(Value::as_str).unwrap_or("");
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let params = request.get("params").cloned().unwrap_or_else(|| json!({}));

        let response = match method {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()),
            "notifications/initialized" | "initialized" => {
                debug!("client initialized (no response)");
                return None;
            }
            "tools/list" => JsonRpcResponse::success(
                id,
                json!({ "tools": self.registry.descriptors() }),
            ),
            "tools/call" => self.call_tool(id, &params).await,
            other => JsonRpcResponse::failure(id, format!("Unknown method: {}", other)),
        };

        // Serializing plain JSON values cannot fail
        let response = serde_json::to_value(response).unwrap_or(Value::Null);
        debug!("response: {}", response);
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        match self.registry.call(name, &arguments).await {
            Ok(result) => JsonRpcResponse::success(id, result.to_value()),
            Err(Error::ToolNotFound(name)) => {
                JsonRpcResponse::failure(id, format!("Unknown tool: {}", name))
            }
            Err(Error::ToolExecution { message, .. }) => {
                JsonRpcResponse::failure(id, format!("Tool execution error: {}", message))
            }
            Err(other) => {
                JsonRpcResponse::failure(id, format!("Tool execution error: {}", other))
            }
        }
    }

    /// Serve requests from `reader` until end of stream
    ///
    /// Lines that are not JSON objects are logged and skipped; nothing is
    /// written back for them.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting MCP server with {} tools", self.registry.len());

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request: Value = match serde_json::from_str(line) {
                Ok(request) => request,
                Err(e) => {
                    error!("Invalid JSON received: {} ({})", line, e);
                    continue;
                }
            };

            if !request.is_object() {
                error!("Request is not a JSON object: {}", line);
                continue;
            }

            if let Some(response) = self.handle_request(&request).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Serve on process stdin/stdout until end of input or Ctrl-C
    pub async fn run_stdio(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();

        tokio::select! {
            result = self.run(reader, writer) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Server stopped by user");
                Ok(())
            }
        }
    }
}
