//! Model client selection

use std::sync::Arc;
use toolrelay_foundation::{AgentConfig, Error, ProviderKind, Result};
use toolrelay_provider::{AnthropicProvider, OpenAiProvider, Provider};

/// Build the configured provider around `api_key`
pub fn build_provider(config: &AgentConfig, api_key: String) -> Result<Arc<dyn Provider>> {
    let model = config.model();
    let max_tokens = config.max_tokens();
    let temperature = config.temperature();

    let provider: Arc<dyn Provider> = match config.provider() {
        ProviderKind::Anthropic => {
            let mut provider =
                AnthropicProvider::new(api_key, model, max_tokens).with_temperature(temperature);
            if let Some(ref url) = config.base_url {
                provider = provider.with_api_url(url);
            }
            Arc::new(provider)
        }
        ProviderKind::OpenAi => {
            let mut provider =
                OpenAiProvider::new(api_key, model, max_tokens).with_temperature(temperature);
            if let Some(ref url) = config.base_url {
                provider = provider.with_base_url(url);
            }
            Arc::new(provider)
        }
        ProviderKind::Azure => {
            let endpoint = config.base_url.as_deref().ok_or_else(|| {
                Error::Config("azure provider needs baseUrl (the resource endpoint)".to_string())
            })?;
            Arc::new(
                OpenAiProvider::azure(api_key, endpoint, model, config.api_version(), max_tokens)
                    .with_temperature(temperature),
            )
        }
    };

    Ok(provider)
}
