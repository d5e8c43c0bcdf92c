//! Error types for ToolRelay
//!
//! Every layer reports failures through this one enum.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ToolRelay error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Connection lifecycle
    // ========================================================================
    /// The tool server executable is missing or could not be spawned
    #[error("Startup error: {0}")]
    Startup(String),

    /// The server answered `initialize` with an error
    #[error("Handshake error: {0}")]
    Handshake(String),

    // ========================================================================
    // Wire
    // ========================================================================
    /// Write or read against a process that is not running
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response line that is not valid JSON-RPC
    #[error("Protocol error: {0}")]
    Protocol(String),

    // ========================================================================
    // Tools
    // ========================================================================
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool execution failed: {tool} - {message}")]
    ToolExecution { tool: String, message: String },

    // ========================================================================
    // Configuration / provider
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    // ========================================================================
    // External error conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Other
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Errors that abort `connect()`; nothing after them can proceed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Startup(_) | Error::Handshake(_))
    }

    /// Tool execution error helper
    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Additional From conversions
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::Startup("missing".into()).is_fatal());
        assert!(Error::Handshake("refused".into()).is_fatal());
        assert!(!Error::Transport("closed".into()).is_fatal());
        assert!(!Error::tool_execution("echo", "boom").is_fatal());
    }

    #[test]
    fn test_display() {
        let err = Error::tool_execution("calculate", "division by zero");
        assert_eq!(
            err.to_string(),
            "Tool execution failed: calculate - division by zero"
        );
    }
}
