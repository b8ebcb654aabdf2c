//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.embedgate/config.toml`
//! 2. Local config: `.embedgate/config.toml` (in the working directory)
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{ConfigOverrides, EmbedGateConfig, LogFormat, LoggingConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".embedgate";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".embedgate";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.embedgate`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<EmbedGateConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.embedgate`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path under a working directory.
    pub fn local_config_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        workspace_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<EmbedGateConfig, ConfigError> {
        let mut config = EmbedGateConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(workspace_root)? {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load a single explicit file, skipping global and local lookup.
    pub fn load_file(
        &self,
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<EmbedGateConfig, ConfigError> {
        debug!("Loading config from {:?}", path);
        let mut config = load_config_file(path)?;
        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<EmbedGateConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration.
    pub fn load_local(
        &self,
        workspace_root: &Path,
    ) -> Result<Option<EmbedGateConfig>, ConfigError> {
        let local_path = self.local_config_path(workspace_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Save configuration to the global config file.
    pub fn save_global(&self, config: &EmbedGateConfig) -> Result<PathBuf, ConfigError> {
        let global_path = self.global_config_path().ok_or(ConfigError::NoHomeDir)?;
        save_config_file(&global_path, config)?;
        Ok(global_path)
    }

    /// Save configuration to the local config file.
    pub fn save_local(
        &self,
        workspace_root: &Path,
        config: &EmbedGateConfig,
    ) -> Result<PathBuf, ConfigError> {
        let local_path = self.local_config_path(workspace_root);
        save_config_file(&local_path, config)?;
        Ok(local_path)
    }

    /// Initialize global configuration.
    ///
    /// Creates `~/.embedgate/config.toml` with the starter configuration. An
    /// existing file is left alone.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let config_path = self.global_config_path().ok_or(ConfigError::NoHomeDir)?;
        if !config_path.exists() {
            save_config_file(&config_path, &EmbedGateConfig::starter())?;
        }
        Ok(config_path)
    }

    /// Initialize local configuration.
    ///
    /// Creates `.embedgate/config.toml` with the starter configuration. An
    /// existing file is left alone.
    pub fn init_local(&self, workspace_root: &Path) -> Result<PathBuf, ConfigError> {
        let config_path = self.local_config_path(workspace_root);
        if !config_path.exists() {
            save_config_file(&config_path, &EmbedGateConfig::starter())?;
        }
        Ok(config_path)
    }

    /// Load the raw contents of one file for editing, or an empty config.
    ///
    /// `config set` and `config use` edit a single layer rather than the merged
    /// view, so values inherited from the other layer are not copied into it.
    pub fn load_layer(&self, path: &Path) -> Result<EmbedGateConfig, ConfigError> {
        if path.exists() {
            load_config_file(path)
        } else {
            Ok(EmbedGateConfig::default())
        }
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<EmbedGateConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &EmbedGateConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// Profiles for the same provider are merged field by field; profile keys are
/// compared case-insensitively.
fn merge_configs(base: EmbedGateConfig, overlay: EmbedGateConfig) -> EmbedGateConfig {
    let mut merged = EmbedGateConfig {
        default_provider: overlay.default_provider.or(base.default_provider),
        providers: base.providers,
        logging: merge_logging(base.logging, overlay.logging),
    };

    for (name, profile) in overlay.providers {
        let key = merged
            .profile_name(&name)
            .map(str::to_string)
            .unwrap_or(name);
        let existing = merged.providers.remove(&key).unwrap_or_default();
        merged.providers.insert(key, existing.merge(profile));
    }

    merged
}

/// Merge logging config.
fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
        format: if overlay.format != LogFormat::Text {
            overlay.format
        } else {
            base.format
        },
    }
}
