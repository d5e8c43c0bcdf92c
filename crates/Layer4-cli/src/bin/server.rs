//! toolrelay-server - serves the built-in tools on stdio

use anyhow::Context;
use toolrelay_core::McpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    toolrelay_cli::logging::init(false);

    McpServer::with_builtins()
        .run_stdio()
        .await
        .context("tool server failed")?;

    Ok(())
}
