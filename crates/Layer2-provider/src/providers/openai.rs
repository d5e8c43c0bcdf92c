//! OpenAI provider - non-streaming chat completions
//!
//! Also covers OpenAI-compatible endpoints and Azure OpenAI deployments,
//! which differ only in URL shape and auth header.

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

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// How the key is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>` (Azure)
    ApiKey,
}

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    auth: AuthStyle,
    metadata: ProviderMetadata,
    max_tokens: u32,
    temperature: Option<f32>,
    retry_config: RetryConfig,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_API_URL.to_string(),
            auth: AuthStyle::Bearer,
            metadata: ProviderMetadata::new("openai", "OpenAI", model),
            max_tokens,
            temperature: None,
            retry_config: RetryConfig::default(),
        }
    }

    /// Azure OpenAI deployment named after `deployment`
    ///
    /// `endpoint` is the resource URL, e.g. `https://<name>.openai.azure.com`.
    pub fn azure(
        api_key: impl Into<String>,
        endpoint: &str,
        deployment: impl Into<String>,
        api_version: &str,
        max_tokens: u32,
    ) -> Self {
        let deployment = deployment.into();
        let base_url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            deployment,
            api_version
        );

        let mut provider = Self::new(api_key, deployment, max_tokens).with_base_url(base_url);
        provider.auth = AuthStyle::ApiKey;
        provider.metadata.id = "azure".to_string();
        provider.metadata.display_name = "Azure OpenAI".to_string();
        provider
    }

    /// Full chat-completions URL of a compatible API
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDef],
    ) -> OpenAiRequest {
        let mut api_messages = Vec::with_capacity(messages.len() + 1);

        if let Some(system) = system_prompt {
            api_messages.push(OpenAiMessage {
                role: "system",
                content: system.to_string(),
            });
        }

        // The caller's system prompt already leads
        api_messages.extend(
            messages
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .map(OpenAiMessage::from),
        );

        let api_tools: Vec<OpenAiTool> = tools.iter().map(OpenAiTool::from).collect();

        OpenAiRequest {
            model: self.metadata.model.clone(),
            messages: api_messages,
            max_tokens: self.max_tokens,
            tools: if api_tools.is_empty() {
                None
            } else {
                Some(api_tools)
            },
            temperature: self.temperature,
        }
    }

    async fn send(&self, request: &OpenAiRequest) -> Result<OpenAiResponse, ProviderError> {
        let builder = self.client.post(&self.base_url);
        let builder = match self.auth {
            AuthStyle::Bearer => builder.bearer_auth(&self.api_key),
            AuthStyle::ApiKey => builder.header("api-key", &self.api_key),
        };

        let response = builder
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

/// Reply text of the first choice
///
/// Message content comes first; each tool call follows as
/// `name: <arguments>`, with no separator.
fn render_choice(response: OpenAiResponse) -> Result<String, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

    let mut out = choice.message.content.unwrap_or_default();
    for call in choice.message.tool_calls.unwrap_or_default() {
        out.push_str(&call.function.name);
        out.push_str(": ");
        out.push_str(&call.function.arguments);
    }
    Ok(out)
}

#[async_trait]
impl Provider for OpenAiProvider {
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
            return Err(ProviderError::NotConfigured(format!(
                "missing {} API key",
                self.metadata.display_name
            )));
        }

        let request = self.build_request(system_prompt, messages, tools);
        debug!(
            "{} request: model={}, messages={}, tools={}",
            self.metadata.id,
            request.model,
            request.messages.len(),
            tools.len()
        );

        let response = with_retry(&self.retry_config, "openai_complete", || {
            self.send(&request)
        })
        .await?;

        render_choice(response)
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiReply,
}

#[derive(Debug, Deserialize)]
struct OpenAiReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    function: OpenAiFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    /// JSON text, passed through untouched
    arguments: String,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&Message> for OpenAiMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        };
        OpenAiMessage {
            role,
            content: msg.content.clone(),
        }
    }
}

impl From<&ToolDef> for OpenAiTool {
    fn from(tool: &ToolDef) -> Self {
        OpenAiTool {
            tool_type: "function",
            function: OpenAiFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_request() {
        let provider = OpenAiProvider::new("key", "gpt-test", 500).with_temperature(0.0);
        let messages = vec![
            Message::system("dropped"),
            Message::user("hello"),
            Message::assistant("hi"),
        ];
        let tools = vec![ToolDef::new("echo", "Echo", json!({"type": "object"}))];

        let request = serde_json::to_value(provider.build_request(Some("sys"), &messages, &tools))
            .unwrap();

        assert_eq!(request["model"], "gpt-test");
        assert_eq!(request["max_tokens"], 500);
        assert_eq!(
            request["messages"],
            json!([
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "hi"}
            ])
        );
        assert_eq!(
            request["tools"],
            json!([{
                "type": "function",
                "function": {"name": "echo", "description": "Echo", "parameters": {"type": "object"}}
            }])
        );
        assert_eq!(request["temperature"], 0.0);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let provider = OpenAiProvider::new("key", "m", 10);
        let request =
            serde_json::to_value(provider.build_request(None, &[Message::user("x")], &[])).unwrap();
        assert!(request.get("tools").is_none());
        assert!(request.get("temperature").is_none());
        assert_eq!(request["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_azure_url() {
        let provider = OpenAiProvider::azure(
            "key",
            "https://res.openai.azure.com/",
            "gpt-4o",
            "2024-10-21",
            10,
        );
        assert_eq!(
            provider.base_url(),
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-10-21"
        );
        assert_eq!(provider.auth, AuthStyle::ApiKey);
        assert_eq!(provider.metadata().id, "azure");
        assert_eq!(provider.metadata().model, "gpt-4o");
    }

    #[test]
    fn test_render_choice() {
        let response: OpenAiResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Let me check. ",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "echo", "arguments": "{\"text\":\"hi\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4}
        }))
        .unwrap();

        assert_eq!(
            render_choice(response).unwrap(),
            r#"Let me check. echo: {"text":"hi"}"#
        );
    }

    #[test]
    fn test_null_content_and_no_choices() {
        let response: OpenAiResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert_eq!(render_choice(response).unwrap(), "");

        let empty: OpenAiResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            render_choice(empty),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let provider = OpenAiProvider::new("", "m", 10);
        let err = provider
            .complete(None, &[Message::user("x")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
