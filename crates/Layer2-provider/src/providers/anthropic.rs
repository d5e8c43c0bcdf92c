//! Anthropic (Claude) provider - non-streaming Messages API

use crate::{
    error::ProviderError,
    r#trait::{Provider, ProviderMetadata},
    retry::{with_retry, RetryConfig},
    ToolDef,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use toolrelay_foundation::{Message, MessageRole};
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    api_url: String,
    metadata: ProviderMetadata,
    max_tokens: u32,
    temperature: Option<f32>,
    retry_config: RetryConfig,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: ANTHROPIC_API_URL.to_string(),
            metadata: ProviderMetadata::new("anthropic", "Anthropic", model),
            max_tokens,
            temperature: None,
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Point at a different endpoint (proxies, gateways)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn build_request(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDef],
    ) -> AnthropicRequest {
        // System text travels in its own field
        let api_messages = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(AnthropicMessage::from)
            .collect();

        let api_tools: Vec<AnthropicTool> = tools.iter().map(AnthropicTool::from).collect();

        AnthropicRequest {
            model: self.metadata.model.clone(),
            max_tokens: self.max_tokens,
            system: system_prompt.map(str::to_string),
            messages: api_messages,
            tools: if api_tools.is_empty() {
                None
            } else {
                Some(api_tools)
            },
            temperature: self.temperature,
        }
    }

    async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_http_status(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Flatten response blocks into one string
///
/// Text blocks are copied as is; each `tool_use` block becomes
/// `name: <json input>`. Blocks are joined without a separator.
fn render_content(blocks: &[ContentBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            ContentBlock::Text { text } => out.push_str(text),
            ContentBlock::ToolUse { name, input, .. } => {
                out.push_str(name);
                out.push_str(": ");
                out.push_str(&input.to_string());
            }
            ContentBlock::Other => {}
        }
    }
    out
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn complete(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDef],
    ) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("missing Anthropic API key".to_string()));
        }

        let request = self.build_request(system_prompt, messages, tools);
        debug!(
            "anthropic request: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            tools.len()
        );

        let response = with_retry(&self.retry_config, "anthropic_complete", || {
            self.send(&request)
        })
        .await?;

        debug!(
            "anthropic response: {} blocks, stop_reason={:?}",
            response.content.len(),
            response.stop_reason
        );
        Ok(render_content(&response.content))
    }
}

// ============================================================================
// Anthropic API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[allow(dead_code)]
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&Message> for AnthropicMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::Assistant => "assistant",
            MessageRole::User | MessageRole::System => "user",
        };
        AnthropicMessage {
            role,
            content: msg.content.clone(),
        }
    }
}

impl From<&ToolDef> for AnthropicTool {
    fn from(tool: &ToolDef) -> Self {
        AnthropicTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        }
    }
}
