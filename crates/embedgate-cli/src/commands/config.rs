//! Config command - View and manage configuration
//!
//! Provides commands for viewing and modifying EmbedGate configuration:
//! - Show the effective configuration with keys masked
//! - Create a starter configuration file
//! - Set profile fields and select the default provider (local or global)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use embedgate_config::{ConfigLoader, EmbedGateConfig};
use embedgate_embed::ProviderKind;
use serde::Serialize;

use super::{load_config, mask_key, print_info};
use crate::GlobalOptions;

/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show(ShowArgs),

    /// Show configuration file paths
    Path(PathArgs),

    /// Create a starter configuration file
    Init(InitArgs),

    /// Set one field of a provider profile
    Set(SetArgs),

    /// Select the default provider
    Use(UseArgs),
}

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the path command
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Create the global config (~/.embedgate/config.toml) instead of local
    #[arg(long)]
    global: bool,
}

/// Arguments for the set command
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Provider identifier (e.g. openai, ollama, "azure openai")
    provider: String,

    /// Profile field (e.g. base_url, model_name, api_key_env)
    field: String,

    /// Value to set
    value: String,

    /// Set in global config (~/.embedgate/config.toml) instead of local
    #[arg(long)]
    global: bool,
}

/// Arguments for the use command
#[derive(Args, Debug)]
pub struct UseArgs {
    /// Provider identifier
    provider: String,

    /// Set in global config instead of local
    #[arg(long)]
    global: bool,
}

/// Configuration paths
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    /// Global config file path
    pub global: Option<PathBuf>,
    /// Local config file path
    pub local: PathBuf,
    /// Whether global config exists
    pub global_exists: bool,
    /// Whether local config exists
    pub local_exists: bool,
}

/// Execute the config command
pub async fn execute(cmd: ConfigCommand, global: GlobalOptions) -> Result<()> {
    match cmd {
        ConfigCommand::Show(args) => execute_show(args, global).await,
        ConfigCommand::Path(args) => execute_path(args, global).await,
        ConfigCommand::Init(args) => execute_init(args, global).await,
        ConfigCommand::Set(args) => execute_set(args, global).await,
        ConfigCommand::Use(args) => execute_use(args, global).await,
    }
}

async fn execute_show(args: ShowArgs, global: GlobalOptions) -> Result<()> {
    let config = masked(load_config(&global)?);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to render configuration")?
        );
    }

    Ok(())
}

async fn execute_path(args: PathArgs, global: GlobalOptions) -> Result<()> {
    let workspace_path = current_dir()?;
    let loader = ConfigLoader::new();

    let global_path = loader.global_config_path();
    let local_path = loader.local_config_path(&workspace_path);

    let paths = ConfigPaths {
        global: global_path.clone(),
        local: local_path.clone(),
        global_exists: global_path.as_ref().map(|p| p.exists()).unwrap_or(false),
        local_exists: local_path.exists(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        println!("Configuration Paths");
        println!("===================\n");

        if let Some(ref gp) = paths.global {
            println!("Global: {} ({})", gp.display(), status(paths.global_exists));
        } else {
            println!("Global: not available (no home directory)");
        }
        println!(
            "Local:  {} ({})",
            paths.local.display(),
            status(paths.local_exists)
        );
        if let Some(ref explicit) = global.config {
            println!("Explicit: {} ({})", explicit.display(), status(explicit.exists()));
        }
    }

    Ok(())
}

async fn execute_init(args: InitArgs, global: GlobalOptions) -> Result<()> {
    let loader = ConfigLoader::new();
    let path = if args.global {
        loader.global_config_path()
    } else {
        Some(loader.local_config_path(&current_dir()?))
    };
    let existed = path.as_ref().map(|p| p.exists()).unwrap_or(false);

    let path = if args.global {
        loader.init_global()?
    } else {
        loader.init_local(&current_dir()?)?
    };

    if existed {
        print_info(
            &format!("Config already exists at {}, left unchanged", path.display()),
            global.quiet,
        );
    } else {
        println!("Created {}", path.display());
    }

    Ok(())
}

async fn execute_set(args: SetArgs, _global: GlobalOptions) -> Result<()> {
    let provider = canonical_provider(&args.provider)?;
    let loader = ConfigLoader::new();
    let path = layer_path(&loader, args.global)?;

    let mut config = loader.load_layer(&path)?;
    config
        .set_field(provider, &args.field, &args.value)
        .with_context(|| format!("Failed to set {}.{}", provider, args.field))?;
    save_layer(&loader, &config, args.global)?;

    let shown = if args.field == "api_key" {
        mask_key(&args.value)
    } else {
        args.value.clone()
    };
    println!(
        "Set providers.\"{}\".{} = {} in {} config",
        provider,
        args.field,
        shown,
        layer_name(args.global)
    );

    Ok(())
}

async fn execute_use(args: UseArgs, global: GlobalOptions) -> Result<()> {
    let provider = canonical_provider(&args.provider)?;

    // The profile may live in the other layer
    let merged = load_config(&global)?;
    if merged.profile(provider).is_none() {
        anyhow::bail!(
            "Provider '{}' has no profile. Create one first: embedgate config set {:?} base_url <URL>",
            provider,
            provider
        );
    }

    let loader = ConfigLoader::new();
    let path = layer_path(&loader, args.global)?;
    let mut config = loader.load_layer(&path)?;
    config.default_provider = Some(provider.to_string());
    save_layer(&loader, &config, args.global)?;

    println!(
        "Default provider set to '{}' in {} config",
        provider,
        layer_name(args.global)
    );

    Ok(())
}

/// Resolve any accepted spelling to the canonical identifier
fn canonical_provider(provider: &str) -> Result<&'static str> {
    let kind: ProviderKind = provider.parse().with_context(|| {
        let known: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.id()).collect();
        format!("Known providers: {}", known.join(", "))
    })?;
    Ok(kind.id())
}

/// Copy of the configuration with every stored key masked
fn masked(mut config: EmbedGateConfig) -> EmbedGateConfig {
    for profile in config.providers.values_mut() {
        if let Some(ref key) = profile.api_key {
            profile.api_key = Some(mask_key(key));
        }
    }
    config
}

fn layer_path(loader: &ConfigLoader, global: bool) -> Result<PathBuf> {
    if global {
        loader
            .global_config_path()
            .context("Could not determine home directory for global config")
    } else {
        Ok(loader.local_config_path(&current_dir()?))
    }
}

fn save_layer(loader: &ConfigLoader, config: &EmbedGateConfig, global: bool) -> Result<PathBuf> {
    let path = if global {
        loader.save_global(config)?
    } else {
        loader.save_local(&current_dir()?, config)?
    };
    Ok(path)
}

fn layer_name(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "local"
    }
}

fn status(exists: bool) -> &'static str {
    if exists {
        "exists"
    } else {
        "not found"
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedgate_config::ProviderProfile;

    #[test]
    fn test_canonical_provider() {
        assert_eq!(canonical_provider("Azure").unwrap(), "azure openai");
        assert_eq!(canonical_provider("LM Studio").unwrap(), "ml studio");
        let err = canonical_provider("cohere").unwrap_err();
        assert!(format!("{:#}", err).contains("deepseek"));
    }

    #[test]
    fn test_masked_hides_inline_keys() {
        let mut config = EmbedGateConfig::starter();
        config.providers.insert(
            "gemini".to_string(),
            ProviderProfile {
                api_key: Some("AIzaSyExampleKey123".to_string()),
                ..Default::default()
            },
        );

        let shown = masked(config);
        assert_eq!(
            shown.profile("gemini").unwrap().api_key.as_deref(),
            Some("AIzaS...123")
        );
        assert!(shown.profile("openai").unwrap().api_key.is_none());
    }
}
