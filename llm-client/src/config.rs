//! Preset registry read from `~/.config/cli-programs/llm.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LlmError, Result};

/// Preset used when neither the caller nor the file names one.
pub const FALLBACK_PRESET: &str = "ollama";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "fallback_preset")]
    pub default_preset: String,

    /// program name -> preset name
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    #[serde(default)]
    pub presets: HashMap<String, ModelPreset>,

    /// Credentials and endpoints, keyed by provider identifier
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn fallback_preset() -> String {
    FALLBACK_PRESET.to_string()
}

/// A provider plus the model to request from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPreset {
    /// One of: anthropic, openrouter, ollama, openai-compatible
    pub provider: String,
    pub model: String,
}

impl ModelPreset {
    fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Takes precedence over the provider's environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat completions root, e.g. `http://gpu-box:8000/v1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// A missing file is not an error; the built-in presets are used instead.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| LlmError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("llm.toml"))
    }

    pub fn get_preset(&self, name: &str) -> Result<&ModelPreset> {
        self.presets
            .get(name)
            .ok_or_else(|| LlmError::InvalidPreset(name.to_string()))
    }

    pub fn get_default_for_program(&self, program: &str) -> &str {
        self.defaults
            .get(program)
            .map(String::as_str)
            .unwrap_or(&self.default_preset)
    }

    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }

    /// Pick the requested preset, or the program's default when none is given.
    pub fn resolve<'a>(
        &'a self,
        requested: Option<&'a str>,
        program: &str,
    ) -> Result<(&'a str, &'a ModelPreset)> {
        let name = requested.unwrap_or_else(|| self.get_default_for_program(program));
        Ok((name, self.get_preset(name)?))
    }

    /// Presets ordered by name, for listings.
    pub fn sorted_presets(&self) -> Vec<(&str, &ModelPreset)> {
        let mut presets: Vec<_> = self
            .presets
            .iter()
            .map(|(name, preset)| (name.as_str(), preset))
            .collect();
        presets.sort_by_key(|(name, _)| *name);
        presets
    }
}

impl Default for Config {
    fn default() -> Self {
        // ollama runs locally without credentials
        let presets = HashMap::from([
            (
                "ollama".to_string(),
                ModelPreset::new("ollama", "llama3.1"),
            ),
            (
                "anthropic-haiku".to_string(),
                ModelPreset::new("anthropic", "claude-3-5-haiku-latest"),
            ),
            (
                "openrouter-llama".to_string(),
                ModelPreset::new("openrouter", "meta-llama/llama-3.1-8b-instruct"),
            ),
        ]);

        Self {
            default_preset: fallback_preset(),
            defaults: HashMap::new(),
            presets,
            providers: HashMap::new(),
        }
    }
}
