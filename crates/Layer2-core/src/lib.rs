//! toolrelay-core: tool protocol runtime
//!
//! Layer2 - both ends of the tool protocol
//!
//! # Modules
//!
//! - `mcp`: wire types, stdio transport, protocol client
//! - `server`: request dispatch, tool registry, built-in tools
//!
//! # Example
//!
//! ```ignore
//! use toolrelay_core::McpClient;
//! use toolrelay_foundation::ServerConfig;
//!
//! let client = McpClient::new();
//! client.connect(&ServerConfig::new("toolrelay-server")).await?;
//!
//! let text = client.call_tool("echo", json!({"text": "hi"})).await;
//! assert_eq!(text, "Echo: hi");
//!
//! client.cleanup().await?;
//! ```

pub mod mcp;
pub mod server;

// Re-exports: client side
pub use mcp::{
    render_tool_result, LineTransport, McpClient, McpContent, McpTool, McpToolResult,
    StdioTransport,
};

// Re-exports: server side
pub use server::{McpServer, ServerTool, ToolRegistry};
