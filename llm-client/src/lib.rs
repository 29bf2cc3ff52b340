//! Generative model client library for study-notes
//!
//! One trait, several backends:
//! - Anthropic Messages API
//! - OpenAI-compatible chat completions (OpenRouter, Ollama, vLLM, ...)
//! - A scripted mock for tests

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, MockReply, ProviderKind, get_provider};
