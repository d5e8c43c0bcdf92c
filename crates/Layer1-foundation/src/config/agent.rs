//! Agent Config - settings for one agent session

use super::ServerConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder replaced by the rendered tool list
pub const TOOLS_PLACEHOLDER: &str = "{{mcp_tools}}";

pub const DEFAULT_MAX_TURNS: usize = 5;
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-2024-11-20";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful assistant that can use tools.

To use a tool, answer with a single line of the form:
Action: <tool_name>: <JSON arguments>

You will then receive a line starting with "Observation:" holding the tool result.
When you have the final answer, reply without any Action line.

{{mcp_tools}}"#;

/// Which completion API the agent talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    /// OpenAI chat completions or a compatible endpoint
    OpenAi,
    /// Azure OpenAI deployment
    Azure,
}

impl ProviderKind {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => DEFAULT_MODEL,
            ProviderKind::OpenAi | ProviderKind::Azure => DEFAULT_OPENAI_MODEL,
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => DEFAULT_API_KEY_ENV,
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Azure => "AZURE_OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            "azure" => Ok(ProviderKind::Azure),
            other => Err(format!(
                "unknown provider '{}' (expected anthropic, openai or azure)",
                other
            )),
        }
    }
}

/// Agent settings
///
/// Every field is optional so partial files can be layered; accessors
/// resolve the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Inline system prompt (wins over `system_prompt_file`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// System prompt file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<PathBuf>,

    /// Tool server
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Pass tool descriptors to the model natively instead of via the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_llm_tools: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,

    /// Endpoint override; the resource endpoint for Azure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Azure `api-version` query value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Environment variable holding the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns.unwrap_or(DEFAULT_MAX_TURNS)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.0)
    }

    pub fn use_llm_tools(&self) -> bool {
        self.use_llm_tools.unwrap_or(false)
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider.unwrap_or_default()
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider().default_model())
    }

    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .unwrap_or(DEFAULT_AZURE_API_VERSION)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider().default_api_key_env())
    }

    /// API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        let var = self.api_key_env();
        std::env::var(var)
            .map_err(|_| Error::Config(format!("environment variable {} is not set", var)))
    }

    /// Resolve the system prompt text: inline, then file, then built-in
    pub fn system_prompt_text(&self) -> Result<String> {
        if let Some(ref prompt) = self.system_prompt {
            return Ok(prompt.clone());
        }

        match self.system_prompt_file {
            Some(ref path) => std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!(
                    "cannot read system prompt {}: {}",
                    path.display(),
                    e
                ))
            }),
            None => Ok(DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }

    /// Overlay `later` on top of `self`
    pub fn merge(self, later: AgentConfig) -> AgentConfig {
        AgentConfig {
            system_prompt: later.system_prompt.or(self.system_prompt),
            system_prompt_file: later.system_prompt_file.or(self.system_prompt_file),
            server: self.server.merge(later.server),
            max_turns: later.max_turns.or(self.max_turns),
            temperature: later.temperature.or(self.temperature),
            use_llm_tools: later.use_llm_tools.or(self.use_llm_tools),
            provider: later.provider.or(self.provider),
            base_url: later.base_url.or(self.base_url),
            api_version: later.api_version.or(self.api_version),
            model: later.model.or(self.model),
            max_tokens: later.max_tokens.or(self.max_tokens),
            api_key_env: later.api_key_env.or(self.api_key_env),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::new();
        assert_eq!(config.max_turns(), 5);
        assert_eq!(config.temperature(), 0.0);
        assert!(!config.use_llm_tools());
        assert_eq!(config.api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(config.provider(), ProviderKind::Anthropic);
        assert_eq!(config.model(), DEFAULT_MODEL);

        let prompt = config.system_prompt_text().unwrap();
        assert!(prompt.contains("Action: <tool_name>"));
        assert!(prompt.contains(TOOLS_PLACEHOLDER));
    }

    #[test]
    fn test_camel_case_parsing() {
        let config: AgentConfig = serde_json::from_str(
            r#"{"maxTurns": 3, "useLlmTools": true, "server": {"command": "srv", "args": ["-v"]}}"#,
        )
        .unwrap();

        assert_eq!(config.max_turns(), 3);
        assert!(config.use_llm_tools());
        assert_eq!(config.server.command.as_deref(), Some("srv"));
        assert_eq!(config.server.args, vec!["-v".to_string()]);
    }

    #[test]
    fn test_inline_prompt_wins() {
        let config = AgentConfig {
            system_prompt: Some("inline".to_string()),
            system_prompt_file: Some(PathBuf::from("/definitely/not/here.md")),
            ..Default::default()
        };
        assert_eq!(config.system_prompt_text().unwrap(), "inline");
    }

    #[test]
    fn test_missing_prompt_file() {
        let config = AgentConfig {
            system_prompt_file: Some(PathBuf::from("/definitely/not/here.md")),
            ..Default::default()
        };
        assert!(matches!(config.system_prompt_text(), Err(Error::Config(_))));
    }

    #[test]
    fn test_merge() {
        let base = AgentConfig {
            max_turns: Some(8),
            model: Some("a".to_string()),
            ..Default::default()
        };
        let overlay = AgentConfig {
            model: Some("b".to_string()),
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.max_turns(), 8);
        assert_eq!(merged.model(), "b");
    }

    #[test]
    fn test_provider_defaults_follow_kind() {
        let config: AgentConfig =
            serde_json::from_str(r#"{"provider": "azure", "baseUrl": "https://res.example"}"#)
                .unwrap();
        assert_eq!(config.provider(), ProviderKind::Azure);
        assert_eq!(config.model(), DEFAULT_OPENAI_MODEL);
        assert_eq!(config.api_key_env(), "AZURE_OPENAI_API_KEY");
        assert_eq!(config.api_version(), DEFAULT_AZURE_API_VERSION);

        let config: AgentConfig =
            serde_json::from_str(r#"{"provider": "openai", "apiKeyEnv": "MY_KEY"}"#).unwrap();
        assert_eq!(config.provider(), ProviderKind::OpenAi);
        assert_eq!(config.api_key_env(), "MY_KEY");

        assert!(serde_json::from_str::<AgentConfig>(r#"{"provider": "other"}"#).is_err());

        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert!("other".parse::<ProviderKind>().is_err());
    }
}
