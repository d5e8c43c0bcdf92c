//! Configuration
//!
//! - `agent.rs`: `AgentConfig` (prompt, turn budget, model settings)
//! - `server.rs`: `ServerConfig` (tool server launch settings)
//! - `loader.rs`: layered settings discovery

mod agent;
mod loader;
mod server;

pub use agent::{
    AgentConfig, ProviderKind, DEFAULT_API_KEY_ENV, DEFAULT_AZURE_API_VERSION,
    DEFAULT_MAX_TOKENS, DEFAULT_MAX_TURNS, DEFAULT_MODEL, DEFAULT_OPENAI_MODEL,
    TOOLS_PLACEHOLDER,
};
pub use loader::{load_config_from_file, ConfigLoader, CONFIG_DIR_NAME};
pub use server::ServerConfig;
