//! EmbedGate CLI - test and use embedding provider configurations
//!
//! # Usage
//!
//! ```bash
//! # Check that the configured provider answers
//! embedgate test
//!
//! # Try another provider without touching the config files
//! embedgate --provider ollama --base-url http://localhost:11434 --model nomic-embed-text test
//!
//! # Embed texts and print the vectors
//! embedgate embed "first text" "second text" --json
//!
//! # Manage configuration
//! embedgate config set openai model_name text-embedding-3-small --global
//! embedgate config use openai
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use embedgate_config::{ConfigOverrides, LogFormat, LoggingConfig};
use embedgate_embed::ProviderKind;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// EmbedGate - one command line for many embedding providers
#[derive(Parser, Debug)]
#[command(name = "embedgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Path to a configuration file (skips global and local lookup)
    #[arg(long, short = 'c', global = true, env = "EMBEDGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Provider identifier (e.g. openai, "azure openai", ollama)
    #[arg(long, short = 'p', global = true, env = "EMBEDGATE_PROVIDER")]
    provider: Option<String>,

    /// Override the provider's base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Override the provider's model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Override the provider's API key
    #[arg(long, global = true, env = "EMBEDGATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            provider: self.provider.as_deref().map(canonical_provider_id),
            base_url: self.base_url.clone(),
            model_name: self.model.clone(),
            api_key: self.api_key.clone(),
            log_level: self.log_level_override().map(str::to_string),
        }
    }

    fn log_level_override(&self) -> Option<&'static str> {
        if self.quiet {
            Some("error")
        } else if self.verbose {
            Some("debug")
        } else {
            None
        }
    }
}

/// Map an accepted spelling to the identifier profiles are stored under.
///
/// Unknown identifiers pass through so validation can name them.
fn canonical_provider_id(provider: &str) -> String {
    provider
        .parse::<ProviderKind>()
        .map(|kind| kind.id().to_string())
        .unwrap_or_else(|_| provider.to_string())
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Test the active provider configuration with one embedding call
    Test(commands::test::TestArgs),

    /// Embed texts with the active provider
    Embed(commands::embed::EmbedArgs),

    /// List supported providers
    Providers(commands::providers::ProvidersArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

/// Install the stderr subscriber.
///
/// `-v`/`-q` win over `RUST_LOG`, which wins over `logging.level`.
fn init_logging(global: &GlobalOptions, logging: &LoggingConfig) -> Result<()> {
    let filter = match global.log_level_override() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.level))
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };

    match logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .try_init()?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself
    let logging = commands::load_config(&cli.global)
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&cli.global, &logging)?;

    match cli.command {
        Commands::Test(args) => commands::test::execute(args, cli.global).await,
        Commands::Embed(args) => commands::embed::execute(args, cli.global).await,
        Commands::Providers(args) => commands::providers::execute(args, cli.global).await,
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global).await,
    }
}
