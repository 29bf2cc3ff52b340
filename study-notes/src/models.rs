//! Model provider lookup from the shared preset registry.

use anyhow::{Context, Result};
use llm_client::{Config, LlmProvider, get_provider};

/// Program key for per-program defaults in llm.toml.
pub const PROGRAM: &str = "study-notes";

/// Build a provider from a named preset, or this program's default preset.
pub fn load_model(preset_name: Option<&str>, debug: bool) -> Result<Box<dyn LlmProvider>> {
    let config = Config::load().context("Failed to load LLM configuration")?;

    let (preset_name, preset) = config
        .resolve(preset_name, PROGRAM)
        .context("Unknown model preset")?;

    let provider_config = config.get_provider_config(&preset.provider);
    let provider = get_provider(preset, provider_config).with_context(|| {
        format!(
            "Failed to initialize provider '{}' for preset '{}'",
            preset.provider, preset_name
        )
    })?;

    if debug {
        eprintln!(
            "Using LLM provider: {} (model: {}, preset: {})",
            provider.name(),
            preset.model,
            preset_name
        );
    }

    Ok(provider)
}
