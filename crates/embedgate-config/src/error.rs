//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::PROFILE_FIELDS;

/// Errors that can occur while loading, editing or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize configuration
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Failed to write configuration file
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create configuration directory
    #[error("failed to create config directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Home directory not found
    #[error("could not determine home directory")]
    NoHomeDir,

    /// Profile field name not in [`PROFILE_FIELDS`]
    #[error("unknown profile field '{field}'. Valid fields: {}", PROFILE_FIELDS.join(", "))]
    UnknownField { field: String },

    /// Profile field value out of range or unparseable
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Neither `default_provider` nor `--provider` names a provider
    #[error("no provider selected: set default_provider or pass --provider")]
    NoProviderSelected,

    /// No profile for the requested provider
    #[error("provider '{name}' has no profile in configuration (add a [providers.\"{name}\"] section)")]
    ProviderNotFound { name: String },
}

impl ConfigError {
    /// Create a new ReadFile error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a new ParseToml error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// Create a new WriteFile error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a new CreateDir error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create a new InvalidValue error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new ProviderNotFound error.
    pub fn provider_not_found(name: impl Into<String>) -> Self {
        Self::ProviderNotFound { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::NoHomeDir;
        assert_eq!(err.to_string(), "could not determine home directory");

        let err = ConfigError::invalid_value("providers.openai.timeout_secs", "must be greater than zero");
        assert!(err.to_string().contains("providers.openai.timeout_secs"));
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_unknown_field_lists_valid_fields() {
        let err = ConfigError::UnknownField {
            field: "temperature".into(),
        };
        let message = err.to_string();
        assert!(message.contains("temperature"));
        assert!(message.contains("base_url"));
        assert!(message.contains("requests_per_second"));
    }

    #[test]
    fn test_provider_not_found() {
        let err = ConfigError::provider_not_found("gemini");
        assert!(err.to_string().contains("gemini"));
        assert!(err.to_string().contains("no profile"));
    }
}
