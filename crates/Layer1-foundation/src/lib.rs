//! # toolrelay-foundation
//!
//! Foundation layer for ToolRelay:
//! - Error: the shared error taxonomy
//! - Core: conversation types (Message, MessageRole)
//! - Config: agent and tool server settings, layered loading
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Agent Loop (Layer3)                                    │
//! │      │ prompt                 ▲ observation             │
//! │      ▼                        │                         │
//! │  Provider (Layer2)       Toolbox ─► McpClient (Layer2)  │
//! │                                      │ stdio, one line  │
//! │                                      ▼ per message      │
//! │                               McpServer + ToolRegistry  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core
// ============================================================================
pub use core::{Message, MessageRole};

// ============================================================================
// Config
// ============================================================================
pub use config::{
    AgentConfig, ConfigLoader, ProviderKind, ServerConfig, DEFAULT_MAX_TURNS, TOOLS_PLACEHOLDER,
};
