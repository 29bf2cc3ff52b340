//! LLM provider implementations

mod anthropic;
pub mod mock;
mod openai_compatible;

pub use anthropic::AnthropicProvider;
pub use mock::{MockProvider, MockReply};
pub use openai_compatible::OpenAICompatibleProvider;

use std::str::FromStr;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenRouter,
    Ollama,
    OpenAiCompatible,
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            "openai-compatible" | "openai_compatible" | "openai" => Ok(Self::OpenAiCompatible),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

impl ProviderKind {
    /// Environment variable holding this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Ollama => "OLLAMA_API_KEY",
            Self::OpenAiCompatible => "OPENAI_API_KEY",
        }
    }

    /// Hosted providers refuse anonymous requests; self-hosted ones usually accept them
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Anthropic | Self::OpenRouter)
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind = ProviderKind::from_str(&preset.provider)?;
    let base_url = provider_config.and_then(|c| c.base_url.clone());

    match kind {
        ProviderKind::Anthropic => {
            let api_key = required_api_key(provider_config, kind, "Anthropic")?;
            Ok(Box::new(AnthropicProvider::new(&preset.model, api_key)))
        }
        ProviderKind::OpenRouter => {
            let api_key = required_api_key(provider_config, kind, "OpenRouter")?;
            Ok(Box::new(OpenAICompatibleProvider::openrouter(
                &preset.model,
                api_key,
            )))
        }
        ProviderKind::Ollama => {
            let base_url = base_url.unwrap_or_else(|| OLLAMA_BASE_URL.to_string());
            Ok(Box::new(OpenAICompatibleProvider::new(
                &preset.model,
                &base_url,
                optional_api_key(provider_config, kind),
                "Ollama",
            )))
        }
        ProviderKind::OpenAiCompatible => {
            let base_url = base_url.ok_or_else(|| {
                LlmError::ConfigError(format!(
                    "Provider '{}' needs a base_url in [providers.{}]",
                    preset.provider, preset.provider
                ))
            })?;
            Ok(Box::new(OpenAICompatibleProvider::new(
                &preset.model,
                &base_url,
                optional_api_key(provider_config, kind),
                "OpenAI-compatible",
            )))
        }
    }
}

fn optional_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Option<String> {
    config
        .and_then(|c| c.api_key.clone())
        .or_else(|| std::env::var(kind.env_var()).ok())
}

/// Get API key from config or environment variable
fn required_api_key(
    config: Option<&ProviderConfig>,
    kind: ProviderKind,
    provider_name: &str,
) -> Result<String> {
    debug_assert!(kind.requires_api_key());
    optional_api_key(config, kind).ok_or_else(|| LlmError::MissingApiKey {
        provider: provider_name.to_string(),
        env_var: kind.env_var().to_string(),
    })
}
