use log::warn;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error(
        "API key not found for {provider}. Set {env_var} environment variable or add to config."
    )]
    MissingApiKey { provider: String, env_var: String },

    #[error("Provider not available: {0}")]
    ProviderUnavailable(String),

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Server overloaded (HTTP 503): {message}")]
    ServerOverloaded { message: String },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid model preset: {0}")]
    InvalidPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl LlmError {
    /// Whether the error means the provider cannot serve any request at all.
    ///
    /// Everything else is scoped to the single call that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LlmError::MissingApiKey { .. }
                | LlmError::ProviderUnavailable(_)
                | LlmError::ConfigError(_)
                | LlmError::InvalidPreset(_)
        )
    }

    /// Transport failure; an unreachable endpoint cannot serve any later call either.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() {
            LlmError::ProviderUnavailable(format!("cannot connect: {}", err))
        } else {
            LlmError::ApiError {
                message: format!("Request failed: {}", err),
                status_code: None,
            }
        }
    }

    /// HTTP status mapped onto the error taxonomy.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => LlmError::ProviderUnavailable(format!("authentication rejected: {}", message)),
            429 => LlmError::RateLimited { retry_after: None },
            503 => LlmError::ServerOverloaded { message },
            _ => LlmError::ApiError {
                message,
                status_code: Some(status),
            },
        }
    }
}

/// `{"error": {"message": ...}}`, shared by the Anthropic and OpenAI APIs.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl LlmError {
    /// Non-success response from `provider`; the JSON error message is used when present.
    pub(crate) fn from_response(provider: &str, status: u16, body: String) -> Self {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        warn!("{} returned HTTP {}: {}", provider, status, message);
        Self::from_status(status, message)
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
