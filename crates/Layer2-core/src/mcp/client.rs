//! MCP Client - typed tool API over a line transport
//!
//! Lifecycle: `connect` (spawn, `initialize`, `notifications/initialized`,
//! `tools/list`), any number of `call_tool`, then `cleanup`.

use super::transport::{LineTransport, StdioTransport};
use super::types::{
    render_tool_result, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, McpTool,
    MCP_PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use toolrelay_foundation::{Error, Result, ServerConfig};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Identity sent in `initialize`
pub const CLIENT_NAME: &str = "toolrelay-client";

/// MCP client
pub struct McpClient {
    /// Next request id; starts at 1
    request_id: AtomicU64,

    /// Held across one write/read pair so responses stay matched to requests
    transport: Mutex<Option<Box<dyn LineTransport>>>,

    /// Discovered tools, filled once per connection
    tools: RwLock<BTreeMap<String, McpTool>>,

    /// `serverInfo` from the handshake
    server_info: RwLock<Option<Value>>,
}

impl Default for McpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl McpClient {
    pub fn new() -> Self {
        Self {
            request_id: AtomicU64::new(1),
            transport: Mutex::new(None),
            tools: RwLock::new(BTreeMap::new()),
            server_info: RwLock::new(None),
        }
    }

    /// Spawn the server process and connect to it
    pub async fn connect(&self, config: &ServerConfig) -> Result<()> {
        info!("Connecting to tool server: {:?}", config.command);
        let transport = StdioTransport::start(config).await?;
        self.connect_with(Box::new(transport)).await
    }

    /// Connect over an already established transport
    ///
    /// The transport is kept even if the handshake fails, so `cleanup`
    /// still stops it.
    pub async fn connect_with(&self, transport: Box<dyn LineTransport>) -> Result<()> {
        {
            let mut guard = self.transport.lock().await;
            if let Some(mut old) = guard.replace(transport) {
                old.shutdown().await?;
            }
        }
        self.tools.write().await.clear();

        self.initialize().await?;
        self.discover_tools().await?;

        info!(
            "Connected with tools: {:?}",
            self.tools.read().await.keys().collect::<Vec<_>>()
        );
        Ok(())
    }

    async fn initialize(&self) -> Result<()> {
        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let response = self
            .request("initialize", params)
            .await
            .map_err(|e| Error::Handshake(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(Error::Handshake(format!(
                "server initialization failed: {}",
                error.message_or_default()
            )));
        }

        let result = response.result.unwrap_or(Value::Null);
        if let Some(version) = result.get("protocolVersion").and_then(Value::as_str) {
            if version != MCP_PROTOCOL_VERSION {
                warn!(
                    "Server speaks protocol {}, expected {}",
                    version, MCP_PROTOCOL_VERSION
                );
            }
        }
        *self.server_info.write().await = result.get("serverInfo").cloned();

        self.notify("notifications/initialized").await
    }

    /// Fetch `tools/list` into the cache
    pub async fn discover_tools(&self) -> Result<()> {
        let response = self.request("tools/list", json!({})).await?;

        let mut discovered = BTreeMap::new();
        let entries = response
            .result
            .as_ref()
            .and_then(|r| r.get("tools"))
            .and_then(Value::as_array);

        for entry in entries.into_iter().flatten() {
            let tool: McpTool = serde_json::from_value(entry.clone())
                .map_err(|e| Error::Protocol(format!("invalid tool descriptor: {}", e)))?;
            discovered.insert(tool.name.clone(), tool);
        }

        debug!("Discovered {} tools", discovered.len());
        *self.tools.write().await = discovered;
        Ok(())
    }

    /// Copy of the discovered tools
    pub async fn available_tools(&self) -> BTreeMap<String, McpTool> {
        self.tools.read().await.clone()
    }

    /// `serverInfo` reported by the server
    pub async fn server_info(&self) -> Option<Value> {
        self.server_info.read().await.clone()
    }

    /// Invoke a tool; every outcome comes back as text
    pub async fn call_tool(&self, name: &str, arguments: Value) -> String {
        {
            let tools = self.tools.read().await;
            if !tools.contains_key(name) {
                return format!(
                    "Error: Unknown tool '{}'. Available tools: {:?}",
                    name,
                    tools.keys().collect::<Vec<_>>()
                );
            }
        }

        let params = json!({ "name": name, "arguments": arguments });
        match self.request("tools/call", params).await {
            Ok(JsonRpcResponse {
                result: Some(result),
                ..
            }) => render_tool_result(&result),
            Ok(response) => {
                let message = response
                    .error
                    .as_ref()
                    .map(|e| e.message_or_default())
                    .unwrap_or("Unknown error");
                format!("Tool execution error: {}", message)
            }
            Err(e) => format!("Tool execution failed: {}", e),
        }
    }

    /// Stop the server; safe before `connect` and when called twice
    pub async fn cleanup(&self) -> Result<()> {
        let transport = self.transport.lock().await.take();
        if let Some(mut transport) = transport {
            transport.shutdown().await?;
        }
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        match self.transport.lock().await.as_mut() {
            Some(transport) => transport.is_running(),
            None => false,
        }
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Write a request and read the very next line as its response
    async fn request(&self, method: &str, params: Value) -> Result<JsonRpcResponse> {
        let mut guard = self.transport.lock().await;
        let transport = guard
            .as_mut()
            .ok_or_else(|| Error::Transport("not connected".to_string()))?;

        let request = JsonRpcRequest::new(self.next_id(), method, params);
        let payload = serde_json::to_value(&request)?;
        debug!("-> {}", payload);
        transport.send_line(&payload).await?;

        let line = transport
            .receive_line()
            .await?
            .ok_or_else(|| Error::Transport("server closed its output".to_string()))?;
        debug!("<- {}", line);

        serde_json::from_str(line.trim())
            .map_err(|e| Error::Protocol(format!("invalid JSON response: {}", e)))
    }

    /// Send a notification; nothing is read back
    async fn notify(&self, method: &str) -> Result<()> {
        let mut guard = self.transport.lock().await;
        let transport = guard
            .as_mut()
            .ok_or_else(|| Error::Transport("not connected".to_string()))?;

        let payload = serde_json::to_value(JsonRpcNotification::new(method))?;
        debug!("-> {} (no response expected)", payload);
        transport.send_line(&payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::McpServer;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// In-process peer: each sent line goes straight into `McpServer`
    struct LoopbackTransport {
        server: McpServer,
        pending: VecDeque<String>,
        sent: Arc<std::sync::Mutex<Vec<Value>>>,
        shutdowns: Arc<AtomicUsize>,
        running: bool,
    }

    impl LoopbackTransport {
        fn new(server: McpServer) -> Self {
            Self {
                server,
                pending: VecDeque::new(),
                sent: Arc::default(),
                shutdowns: Arc::default(),
                running: true,
            }
        }
    }

    #[async_trait]
    impl LineTransport for LoopbackTransport {
        async fn send_line(&mut self, payload: &Value) -> Result<()> {
            if !self.running {
                return Err(Error::Transport("stopped".into()));
            }
            self.sent.lock().unwrap().push(payload.clone());
            if let Some(response) = self.server.handle_request(payload).await {
                self.pending.push_back(response.to_string());
            }
            Ok(())
        }

        async fn receive_line(&mut self) -> Result<Option<String>> {
            Ok(self.pending.pop_front())
        }

        async fn shutdown(&mut self) -> Result<()> {
            if self.running {
                self.running = false;
                self.shutdowns.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }

        fn is_running(&mut self) -> bool {
            self.running
        }
    }

    /// Peer that answers every request with a fixed line
    struct ScriptedTransport {
        reply: String,
    }

    #[async_trait]
    impl LineTransport for ScriptedTransport {
        async fn send_line(&mut self, _payload: &Value) -> Result<()> {
            Ok(())
        }

        async fn receive_line(&mut self) -> Result<Option<String>> {
            Ok(Some(self.reply.clone()))
        }

        async fn shutdown(&mut self) -> Result<()> {
            Ok(())
        }

        fn is_running(&mut self) -> bool {
            true
        }
    }

    async fn connected() -> (McpClient, Arc<std::sync::Mutex<Vec<Value>>>, Arc<AtomicUsize>) {
        let transport = LoopbackTransport::new(McpServer::with_builtins());
        let sent = Arc::clone(&transport.sent);
        let shutdowns = Arc::clone(&transport.shutdowns);

        let client = McpClient::new();
        client.connect_with(Box::new(transport)).await.unwrap();
        (client, sent, shutdowns)
    }

    #[tokio::test]
    async fn test_handshake_sequence() {
        let (client, sent, _) = connected().await;
        let sent = sent.lock().unwrap();

        let methods: Vec<&str> = sent.iter().map(|m| m["method"].as_str().unwrap()).collect();
        assert_eq!(
            methods,
            vec!["initialize", "notifications/initialized", "tools/list"]
        );
        assert_eq!(sent[0]["id"], 1);
        assert_eq!(sent[0]["params"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert!(sent[1].get("id").is_none());
        assert_eq!(sent[2]["id"], 2);

        assert!(client.server_info().await.is_some());
    }

    #[tokio::test]
    async fn test_discovery_populates_cache() {
        let (client, _, _) = connected().await;
        let tools = client.available_tools().await;

        assert!(tools.contains_key("echo"));
        assert!(tools.contains_key("calculate"));
        assert_eq!(tools["echo"].input_schema["required"], json!(["text"]));
    }

    #[tokio::test]
    async fn test_call_echo() {
        let (client, _, _) = connected().await;
        let text = client.call_tool("echo", json!({"text": "hi"})).await;
        assert_eq!(text, "Echo: hi");
    }

    #[tokio::test]
    async fn test_call_unknown_tool_is_text() {
        let (client, sent, _) = connected().await;
        let before = sent.lock().unwrap().len();

        let text = client.call_tool("missing_tool", json!({})).await;
        assert!(text.contains("missing_tool"));
        assert!(text.starts_with("Error: Unknown tool"));
        // Rejected locally, nothing sent
        assert_eq!(sent.lock().unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_call_with_bad_arguments_is_text() {
        let (client, _, _) = connected().await;
        let text = client.call_tool("echo", json!({})).await;
        assert!(text.starts_with("Tool execution error:"), "{}", text);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let (client, _, shutdowns) = connected().await;
        client.cleanup().await.unwrap();
        client.cleanup().await.unwrap();
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
        assert!(!client.is_connected().await);

        let text = client.call_tool("echo", json!({"text": "late"})).await;
        assert!(text.starts_with("Tool execution failed:"), "{}", text);
    }

    #[tokio::test]
    async fn test_cleanup_without_connect() {
        let client = McpClient::new();
        client.cleanup().await.unwrap();
        client.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_error() {
        let client = McpClient::new();
        let transport = ScriptedTransport {
            reply: r#"{"jsonrpc":"2.0","id":1,"error":{"code":-1,"message":"nope"}}"#.into(),
        };

        let err = client.connect_with(Box::new(transport)).await.unwrap_err();
        assert!(matches!(err, Error::Handshake(_)));
        client.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_response_is_protocol_error() {
        let client = McpClient::new();
        let transport = ScriptedTransport {
            reply: "not json".into(),
        };
        client.transport.lock().await.replace(Box::new(transport));

        let err = client.discover_tools().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_result_without_content_is_stringified() {
        let client = McpClient::new();
        client.transport.lock().await.replace(Box::new(ScriptedTransport {
            reply: r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[{"name":"raw"}]}}"#.into(),
        }));
        client.discover_tools().await.unwrap();

        let text = client.call_tool("raw", json!({})).await;
        assert_eq!(text, r#"{"tools":[{"name":"raw"}]}"#);
    }

    #[tokio::test]
    async fn test_error_without_message() {
        let client = McpClient::new();
        client.transport.lock().await.replace(Box::new(ScriptedTransport {
            reply: r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[{"name":"t"}]},"error":null}"#
                .into(),
        }));
        client.discover_tools().await.unwrap();
        client.transport.lock().await.replace(Box::new(ScriptedTransport {
            reply: r#"{"jsonrpc":"2.0","id":2,"error":{"code":-1}}"#.into(),
        }));

        let text = client.call_tool("t", json!({})).await;
        assert_eq!(text, "Tool execution error: Unknown error");
    }
}
