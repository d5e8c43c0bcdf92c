//! # toolrelay-provider
//!
//! Text-completion seam for the agent loop.
//!
//! ## Features
//! - One `Provider` trait: conversation in, assistant text out
//! - Automatic retry with exponential backoff
//! - Anthropic Messages API implementation
//! - OpenAI chat completions, including Azure and compatible endpoints
//! - Native tool definitions when the caller wants them

pub mod error;
pub mod providers;
pub mod retry;
pub mod tool_def;
pub mod r#trait;

// Core traits and types
pub use r#trait::{Provider, ProviderMetadata};
pub use tool_def::ToolDef;

// Error and retry
pub use error::ProviderError;
pub use retry::RetryConfig;

// Provider implementations
pub use providers::anthropic::AnthropicProvider;
pub use providers::openai::OpenAiProvider;
