//! EmbedGate Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.embedgate/config.toml`
//! - Local config: `.embedgate/config.toml` (in the working directory)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.
//!
//! # Example TOML
//!
//! ```toml
//! default_provider = "openai"
//!
//! [providers.openai]
//! api_key_env = "OPENAI_API_KEY"
//! base_url = "https://api.openai.com/v1"
//! model_name = "text-embedding-ada-002"
//! retrieval_k = 4
//! timeout_secs = 60
//!
//! [providers.ollama]
//! base_url = "http://localhost:11434"
//! model_name = "nomic-embed-text"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Retrieval depth written into the starter profile
pub const DEFAULT_RETRIEVAL_K: usize = 4;

/// Root configuration for EmbedGate.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EmbedGateConfig {
    /// Provider used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Connection profiles keyed by provider identifier
    pub providers: BTreeMap<String, ProviderProfile>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Connection parameters for one provider.
///
/// Every field is optional so a local file can override a single value of a
/// global profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderProfile {
    /// API key stored in the file (prefer `api_key_env`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Base URL, or the full deployment URL for Azure OpenAI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// Number of neighbours a retrieval pipeline should fetch per query.
    ///
    /// Stored and validated here for the pipeline that consumes the vectors;
    /// the embedding client itself does not read it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_k: Option<usize>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Per-attempt timeout for endpoint discovery in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_timeout_secs: Option<u64>,

    /// Outgoing requests per second (rate-limit feature)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,
}

/// Field names accepted by [`ProviderProfile::set`].
pub const PROFILE_FIELDS: [&str; 8] = [
    "api_key",
    "api_key_env",
    "base_url",
    "model_name",
    "retrieval_k",
    "timeout_secs",
    "discovery_timeout_secs",
    "requests_per_second",
];

impl ProviderProfile {
    /// Resolve the API key: the inline key wins, then the environment variable.
    ///
    /// Returns an empty string when neither is set.
    pub fn resolve_api_key(&self) -> String {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return key.to_string();
        }
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Set one field from its string form.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        match field {
            "api_key" => self.api_key = Some(value.to_string()),
            "api_key_env" => self.api_key_env = Some(value.to_string()),
            "base_url" => self.base_url = Some(value.to_string()),
            "model_name" => self.model_name = Some(value.to_string()),
            "retrieval_k" => self.retrieval_k = Some(parse_number(field, value)?),
            "timeout_secs" => self.timeout_secs = Some(parse_number(field, value)?),
            "discovery_timeout_secs" => {
                self.discovery_timeout_secs = Some(parse_number(field, value)?)
            }
            "requests_per_second" => self.requests_per_second = Some(parse_number(field, value)?),
            _ => {
                return Err(ConfigError::UnknownField {
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Overlay values present in `other` onto this profile.
    pub fn merge(self, other: ProviderProfile) -> ProviderProfile {
        ProviderProfile {
            api_key: other.api_key.or(self.api_key),
            api_key_env: other.api_key_env.or(self.api_key_env),
            base_url: other.base_url.or(self.base_url),
            model_name: other.model_name.or(self.model_name),
            retrieval_k: other.retrieval_k.or(self.retrieval_k),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            discovery_timeout_secs: other.discovery_timeout_secs.or(self.discovery_timeout_secs),
            requests_per_second: other.requests_per_second.or(self.requests_per_second),
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.retrieval_k == Some(0) {
            return Err(ConfigError::invalid_value(
                format!("providers.{}.retrieval_k", name),
                "must be at least 1",
            ));
        }
        for (field, value) in [
            ("timeout_secs", self.timeout_secs),
            ("discovery_timeout_secs", self.discovery_timeout_secs),
        ] {
            if value == Some(0) {
                return Err(ConfigError::invalid_value(
                    format!("providers.{}.{}", name, field),
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_value(field, format!("'{}' is not a number", value)))
}

/// Normalize a provider identifier for use as a profile key.
pub fn profile_key(provider: &str) -> String {
    provider.trim().to_lowercase()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override the active provider
    pub provider: Option<String>,

    /// Override the active profile's base URL
    pub base_url: Option<String>,

    /// Override the active profile's model
    pub model_name: Option<String>,

    /// Override the active profile's API key
    pub api_key: Option<String>,

    /// Override log level
    pub log_level: Option<String>,
}

impl EmbedGateConfig {
    /// Configuration written by `init`: an OpenAI profile reading its key from
    /// `OPENAI_API_KEY`.
    pub fn starter() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "openai".to_string(),
            ProviderProfile {
                api_key_env: Some("OPENAI_API_KEY".to_string()),
                base_url: Some("https://api.openai.com/v1".to_string()),
                model_name: Some("text-embedding-ada-002".to_string()),
                retrieval_k: Some(DEFAULT_RETRIEVAL_K),
                timeout_secs: Some(60),
                ..Default::default()
            },
        );
        Self {
            default_provider: Some("openai".to_string()),
            providers,
            logging: LoggingConfig::default(),
        }
    }

    /// Find the key of a profile, ignoring case and surrounding whitespace.
    pub fn profile_name(&self, provider: &str) -> Option<&str> {
        let wanted = profile_key(provider);
        self.providers
            .keys()
            .find(|key| profile_key(key) == wanted)
            .map(String::as_str)
    }

    /// Look up a profile, ignoring case and surrounding whitespace.
    pub fn profile(&self, provider: &str) -> Option<&ProviderProfile> {
        self.profile_name(provider)
            .and_then(|name| self.providers.get(name))
    }

    /// Mutable profile for a provider, created empty if missing.
    pub fn profile_mut(&mut self, provider: &str) -> &mut ProviderProfile {
        let key = self
            .profile_name(provider)
            .map(str::to_string)
            .unwrap_or_else(|| profile_key(provider));
        self.providers.entry(key).or_default()
    }

    /// Set one profile field, creating the profile if needed.
    pub fn set_field(&mut self, provider: &str, field: &str, value: &str) -> Result<(), ConfigError> {
        self.profile_mut(provider).set(field, value)
    }

    /// Make `provider` the default; it must have a profile.
    pub fn use_provider(&mut self, provider: &str) -> Result<(), ConfigError> {
        let name = self
            .profile_name(provider)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::provider_not_found(provider))?;
        self.default_provider = Some(name);
        Ok(())
    }

    /// Apply CLI overrides to this configuration.
    ///
    /// Connection overrides land on the active provider's profile.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref provider) = overrides.provider {
            self.default_provider = Some(provider.clone());
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }

        let has_connection_override = overrides.base_url.is_some()
            || overrides.model_name.is_some()
            || overrides.api_key.is_some();
        if !has_connection_override {
            return;
        }
        let Some(provider) = self.default_provider.clone() else {
            return;
        };

        let profile = self.profile_mut(&provider);
        if let Some(ref url) = overrides.base_url {
            profile.base_url = Some(url.clone());
        }
        if let Some(ref model) = overrides.model_name {
            profile.model_name = Some(model.clone());
        }
        if let Some(ref key) = overrides.api_key {
            profile.api_key = Some(key.clone());
        }
    }

    /// Active provider and its profile.
    pub fn active_profile(&self) -> Result<(&str, &ProviderProfile), ConfigError> {
        let provider = self
            .default_provider
            .as_deref()
            .ok_or(ConfigError::NoProviderSelected)?;
        let profile = self
            .profile(provider)
            .ok_or_else(|| ConfigError::provider_not_found(provider))?;
        Ok((provider, profile))
    }

    /// Validate the configuration.
    ///
    /// The default provider must have a profile and profile values must be in
    /// range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref provider) = self.default_provider {
            if self.profile(provider).is_none() {
                return Err(ConfigError::provider_not_found(provider));
            }
        }
        for (name, profile) in &self.providers {
            profile.validate(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = EmbedGateConfig::default();
        assert!(config.default_provider.is_none());
        assert!(config.providers.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_starter_config_is_valid() {
        let config = EmbedGateConfig::starter();
        assert!(config.validate().is_ok());
        let (provider, profile) = config.active_profile().unwrap();
        assert_eq!(provider, "openai");
        assert_eq!(profile.retrieval_k, Some(DEFAULT_RETRIEVAL_K));
    }

    #[test]
    fn test_profile_lookup_is_case_insensitive() {
        let config: EmbedGateConfig = toml::from_str(
            r#"
            default_provider = "Azure OpenAI"

            [providers."azure openai"]
            base_url = "https://r.openai.azure.com/openai/deployments/d/embeddings?api-version=1"
            "#,
        )
        .unwrap();

        assert!(config.profile(" AZURE OPENAI ").is_some());
        assert!(config.validate().is_ok());
        assert_eq!(config.profile_name("Azure OpenAI"), Some("azure openai"));
    }

    #[test]
    fn test_validate_missing_default_profile() {
        let config = EmbedGateConfig {
            default_provider: Some("gemini".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ProviderNotFound { ref name } if name == "gemini"));
    }

    #[test]
    fn test_active_profile_without_provider() {
        let config = EmbedGateConfig::default();
        assert!(matches!(
            config.active_profile(),
            Err(ConfigError::NoProviderSelected)
        ));
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = EmbedGateConfig::default();
        config.profile_mut("openai").retrieval_k = Some(0);
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("retrieval_k"));

        let mut config = EmbedGateConfig::default();
        config.profile_mut("deepseek").discovery_timeout_secs = Some(0);
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("discovery_timeout_secs"));
    }

    #[test]
    fn test_set_field() {
        let mut config = EmbedGateConfig::default();
        config.set_field("Ollama", "model_name", "nomic-embed-text").unwrap();
        config.set_field("ollama", "timeout_secs", "15").unwrap();

        let profile = config.profile("ollama").unwrap();
        assert_eq!(profile.model_name.as_deref(), Some("nomic-embed-text"));
        assert_eq!(profile.timeout_secs, Some(15));
        assert_eq!(config.providers.len(), 1);

        assert!(config.set_field("ollama", "timeout_secs", "soon").is_err());
        let err = config.set_field("ollama", "temperature", "0.2").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownField { ref field } if field == "temperature"));
    }

    #[test]
    fn test_use_provider_requires_profile() {
        let mut config = EmbedGateConfig::starter();
        assert!(matches!(
            config.use_provider("deepseek"),
            Err(ConfigError::ProviderNotFound { .. })
        ));

        config.set_field("deepseek", "base_url", "https://api.deepseek.com").unwrap();
        config.use_provider("DeepSeek").unwrap();
        assert_eq!(config.default_provider.as_deref(), Some("deepseek"));
    }

    #[test]
    fn test_apply_overrides_targets_active_profile() {
        let mut config = EmbedGateConfig::starter();
        let overrides = ConfigOverrides {
            provider: Some("ollama".to_string()),
            base_url: Some("http://localhost:11434".to_string()),
            model_name: Some("nomic-embed-text".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        config.apply_overrides(&overrides);

        let (provider, profile) = config.active_profile().unwrap();
        assert_eq!(provider, "ollama");
        assert_eq!(profile.base_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.logging.level, "debug");
        // The openai profile is untouched
        assert_eq!(
            config.profile("openai").unwrap().base_url.as_deref(),
            Some("https://api.openai.com/v1")
        );
    }

    #[test]
    fn test_resolve_api_key() {
        let inline = ProviderProfile {
            api_key: Some("sk-inline".to_string()),
            api_key_env: Some("EMBEDGATE_TEST_UNUSED_KEY".to_string()),
            ..Default::default()
        };
        assert_eq!(inline.resolve_api_key(), "sk-inline");

        std::env::set_var("EMBEDGATE_TEST_RESOLVE_KEY", "sk-from-env");
        let from_env = ProviderProfile {
            api_key: Some(String::new()),
            api_key_env: Some("EMBEDGATE_TEST_RESOLVE_KEY".to_string()),
            ..Default::default()
        };
        assert_eq!(from_env.resolve_api_key(), "sk-from-env");

        assert_eq!(ProviderProfile::default().resolve_api_key(), "");
    }

    #[test]
    fn test_profile_merge_keeps_unset_fields() {
        let global = ProviderProfile {
            base_url: Some("https://global".to_string()),
            model_name: Some("m1".to_string()),
            ..Default::default()
        };
        let local = ProviderProfile {
            model_name: Some("m2".to_string()),
            ..Default::default()
        };

        let merged = global.merge(local);
        assert_eq!(merged.base_url.as_deref(), Some("https://global"));
        assert_eq!(merged.model_name.as_deref(), Some("m2"));
    }

    #[test]
    fn test_toml_roundtrip_omits_unset_fields() {
        let config = EmbedGateConfig::starter();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(!text.contains("api_key ="));
        let parsed: EmbedGateConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
