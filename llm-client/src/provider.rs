use async_trait::async_trait;

use crate::error::Result;

/// A single prompt sent to a generative model
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Request with only a prompt; provider defaults apply to everything else
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Text generated by a provider
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A generative model reachable by prompt
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for one request
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Provider name for display
    fn name(&self) -> &'static str;

    /// Check the provider can serve requests at all (credentials, endpoint)
    fn is_available(&self) -> Result<()>;
}
