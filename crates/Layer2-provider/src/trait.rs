//! Provider trait
//!
//! The agent loop only needs "send the conversation, get text back".

use crate::error::ProviderError;
use crate::ToolDef;
use async_trait::async_trait;
use toolrelay_foundation::Message;

/// Provider metadata
#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    /// Provider ID (e.g., "anthropic")
    pub id: String,

    /// Display name (e.g., "Anthropic")
    pub display_name: String,

    /// Model used for completions
    pub model: String,
}

impl ProviderMetadata {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            model: model.into(),
        }
    }
}

/// Text-completion provider
#[async_trait]
pub trait Provider: Send + Sync {
    fn metadata(&self) -> &ProviderMetadata;

    /// Complete the conversation, returning the assistant's text
    ///
    /// `tools` is empty unless tool descriptors are passed natively.
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDef],
    ) -> Result<String, ProviderError>;
}
