//! MCP Transport - line framing over a child process's stdio
//!
//! One JSON document per line in each direction. Reads block until the
//! next line arrives; there is no read timeout, so a server that never
//! answers an `id`-bearing request stalls the caller.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use toolrelay_foundation::{Error, Result, ServerConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Grace period between the termination request and a forced kill
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Line-oriented message channel
///
/// `McpClient` only needs these four operations, so tests can swap in an
/// in-memory peer.
#[async_trait]
pub trait LineTransport: Send {
    /// Write `payload` as one JSON line and flush
    async fn send_line(&mut self, payload: &Value) -> Result<()>;

    /// Next line from the peer, `None` once the stream is closed
    async fn receive_line(&mut self) -> Result<Option<String>>;

    /// Stop the peer; safe to call repeatedly
    async fn shutdown(&mut self) -> Result<()>;

    fn is_running(&mut self) -> bool;
}

/// Stdio Transport - owns the tool server process
pub struct StdioTransport {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<Lines<BufReader<ChildStdout>>>,
    stderr_task: Option<JoinHandle<()>>,
}

impl StdioTransport {
    /// Spawn the server described by `config`
    pub async fn start(config: &ServerConfig) -> Result<Self> {
        let command = config.command()?;

        // Bare names are resolved through PATH by the spawn itself
        let looks_like_path = command.contains(std::path::MAIN_SEPARATOR) || command.contains('/');
        if looks_like_path && !Path::new(command).exists() {
            return Err(Error::Startup(format!("server executable not found: {}", command)));
        }

        info!("Spawning tool server: {} {:?}", command, config.args);

        let mut cmd = Command::new(command);
        cmd.args(&config.args)
            .envs(config.expand_env())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref cwd) = config.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Startup(format!("failed to spawn '{}': {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Startup("failed to capture server stdin".to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Startup("failed to capture server stdout".to_string()))?;

        // Drain stderr so a chatty server never blocks on a full pipe
        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("server stderr: {}", line);
                }
            })
        });

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stdout: Some(BufReader::new(stdout).lines()),
            stderr_task,
        })
    }

    /// Process id, while running
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    #[cfg(unix)]
    fn request_termination(child: &mut Child) {
        if let Some(pid) = child.id() {
            // SAFETY: plain signal delivery to a child we own
            let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
            if rc != 0 {
                warn!("Failed to send SIGTERM to {}", pid);
            }
        }
    }

    #[cfg(not(unix))]
    fn request_termination(child: &mut Child) {
        // No SIGTERM here; closing stdin is the graceful request
        let _ = child;
    }
}

#[async_trait]
impl LineTransport for StdioTransport {
    async fn send_line(&mut self, payload: &Value) -> Result<()> {
        if !self.is_running() {
            return Err(Error::Transport("server process is not running".to_string()));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Transport("server stdin is closed".to_string()))?;

        let mut line = serde_json::to_string(payload)?;
        line.push('\n');

        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Transport(format!("write failed: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| Error::Transport(format!("flush failed: {}", e)))?;

        Ok(())
    }

    async fn receive_line(&mut self) -> Result<Option<String>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        stdout
            .next_line()
            .await
            .map_err(|e| Error::Transport(format!("read failed: {}", e)))
    }

    async fn shutdown(&mut self) -> Result<()> {
        // Closing stdin tells a line-reading server its input is done
        self.stdin = None;
        self.stdout = None;

        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if matches!(child.try_wait(), Ok(None)) {
            Self::request_termination(&mut child);

            match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
                Ok(Ok(status)) => debug!("Tool server exited: {}", status),
                Ok(Err(e)) => warn!("Waiting for tool server failed: {}", e),
                Err(_) => {
                    warn!("Tool server ignored termination, killing");
                    child.kill().await?;
                }
            }
        }

        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        info!("Tool server stopped");
        Ok(())
    }

    fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_is_startup_error() {
        let config = ServerConfig::new("/definitely/not/a/server");
        let err = StdioTransport::start(&config).await.err().unwrap();
        assert!(matches!(err, Error::Startup(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_unlaunchable_command_is_startup_error() {
        let config = ServerConfig::new("toolrelay-no-such-binary-on-path");
        let err = StdioTransport::start(&config).await.err().unwrap();
        assert!(matches!(err, Error::Startup(_)));
    }

    #[tokio::test]
    async fn test_empty_command_is_config_error() {
        let err = StdioTransport::start(&ServerConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_line_round_trip_through_cat() {
        let mut transport = StdioTransport::start(&ServerConfig::new("cat"))
            .await
            .unwrap();
        assert!(transport.is_running());

        transport
            .send_line(&serde_json::json!({"ping": 1}))
            .await
            .unwrap();
        let line = transport.receive_line().await.unwrap().unwrap();
        assert_eq!(line, r#"{"ping":1}"#);

        transport.shutdown().await.unwrap();
        assert!(!transport.is_running());
        transport.shutdown().await.unwrap();

        let err = transport
            .send_line(&serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(transport.receive_line().await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_receive_waits_for_silent_peer() {
        // cat never writes unless fed, so the read has nothing to return
        let mut transport = StdioTransport::start(&ServerConfig::new("cat"))
            .await
            .unwrap();

        let waited =
            tokio::time::timeout(Duration::from_millis(200), transport.receive_line()).await;
        assert!(waited.is_err());
        assert!(transport.is_running());

        transport.shutdown().await.unwrap();
        assert!(!transport.is_running());
    }
}
