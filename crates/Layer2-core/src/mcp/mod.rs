//! MCP - Model Context Protocol client side
//!
//! Talks to a tool server child process over stdio.
//!
//! ## Components
//! - `types`: JSON-RPC envelopes, tool descriptors, result text extraction
//! - `transport`: `LineTransport` seam and the process-backed `StdioTransport`
//! - `client`: handshake, discovery, `call_tool`, cleanup
//!
//! ## Reference
//! - https://modelcontextprotocol.io/

mod client;
mod transport;
mod types;

pub use client::{McpClient, CLIENT_NAME};
pub use transport::{LineTransport, StdioTransport, SHUTDOWN_GRACE};
pub use types::{
    render_tool_result, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    McpContent, McpTool, McpToolResult, ERROR_CODE, JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
    TEXT_SEPARATOR,
};
