//! CLI command implementations

pub mod config;
pub mod embed;
pub mod providers;

use anyhow::{Context, Result};
use embedgate_config::{ConfigLoader, EmbedGateConfig};
use embedgate_embed::ProviderConfig;

use crate::GlobalOptions;

/// Load configuration with CLI overrides applied.
///
/// `--config` loads that single file; otherwise global and local files are
/// merged.
pub fn load_config(global: &GlobalOptions) -> Result<EmbedGateConfig> {
    let overrides = global.to_config_overrides();
    let mut loader = ConfigLoader::new();

    if let Some(ref config_path) = global.config {
        return loader
            .load_file(config_path, Some(&overrides))
            .with_context(|| format!("Failed to load config file {}", config_path.display()));
    }

    let workspace = std::env::current_dir().context("Failed to get current directory")?;
    loader
        .load(&workspace, Some(&overrides))
        .context("Failed to load configuration")
}

/// Build the adapter configuration for the active provider.
pub fn to_provider_config(config: &EmbedGateConfig) -> Result<ProviderConfig> {
    config.validate().context("Invalid configuration")?;
    let (provider, profile) = config.active_profile()?;

    let mut provider_config = ProviderConfig::new(
        provider,
        profile.resolve_api_key(),
        profile.base_url.clone().unwrap_or_default(),
        profile.model_name.clone().unwrap_or_default(),
    );
    if let Some(timeout) = profile.timeout_secs {
        provider_config = provider_config.with_timeout(timeout);
    }
    if let Some(timeout) = profile.discovery_timeout_secs {
        provider_config = provider_config.with_discovery_timeout(timeout);
    }
    if let Some(rps) = profile.requests_per_second {
        provider_config = provider_config.with_requests_per_second(rps);
    }
    Ok(provider_config)
}

/// Mask an API key for display, keeping a short prefix and suffix.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        1..=8 => "*".repeat(chars.len()),
        n => format!(
            "{}...{}",
            chars[..5].iter().collect::<String>(),
            chars[n - 3..].iter().collect::<String>()
        ),
    }
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
