//! System Info Tool

use crate::mcp::McpToolResult;
use crate::server::tool::ServerTool;
use async_trait::async_trait;
use serde_json::{json, Value};
use toolrelay_foundation::{Error, Result};

pub struct SystemInfoTool;

impl SystemInfoTool {
    pub const NAME: &'static str = "get_system_info";

    fn platform() -> &'static str {
        match std::env::consts::OS {
            "linux" => "Linux",
            "macos" => "Darwin",
            "windows" => "Windows",
            other => other,
        }
    }
}

#[async_trait]
impl ServerTool for SystemInfoTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn doc(&self) -> Option<&str> {
        Some("Get basic system information including platform and runtime version.")
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _input: Value) -> Result<McpToolResult> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::tool_execution(Self::NAME, e.to_string()))?;

        let info = json!({
            "platform": Self::platform(),
            "arch": std::env::consts::ARCH,
            "runtime_version": format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            "working_directory": cwd.display().to_string(),
        });

        let pretty = serde_json::to_string_pretty(&info)?;
        Ok(McpToolResult::text(format!("System Info: {}", pretty)))
    }
}
