//! Error types for embedgate-embed

use thiserror::Error;

/// Errors that can occur while constructing or calling an embedding adapter
///
/// Configuration variants surface from the factory and abort construction.
/// Every other variant is produced per call and is degraded to an empty
/// vector by [`EmbeddingAdapter::embed_one`](crate::EmbeddingAdapter::embed_one).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Provider identifier not recognized by the factory
    #[error("Unknown embedding provider: '{0}'")]
    UnknownProvider(String),

    /// Deployment URL does not match the expected Azure OpenAI pattern
    #[error(
        "Invalid deployment URL '{0}': expected https://{{host}}/openai/deployments/{{deployment}}/embeddings?api-version={{version}}"
    )]
    InvalidDeploymentUrl(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Transport errors
    // =========================================================================
    /// Connection or I/O failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Provider rejected the credentials
    #[error("Authentication failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    /// Non-success status code
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    // =========================================================================
    // Response errors
    // =========================================================================
    /// Successful status but the body is not the expected shape
    #[error("Invalid response: {0}")]
    ResponseFormat(String),

    /// Every discovery candidate failed
    #[error("All {attempted} candidate endpoints failed; last error: {last_error}")]
    DiscoveryExhausted { attempted: usize, last_error: String },
}

impl EmbedError {
    /// Whether this error comes from adapter construction
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EmbedError::UnknownProvider(_)
                | EmbedError::InvalidDeploymentUrl(_)
                | EmbedError::InvalidConfig(_)
        )
    }

    /// Whether this error happened on the wire (network, timeout, status)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EmbedError::Transport(_)
                | EmbedError::Timeout
                | EmbedError::Auth { .. }
                | EmbedError::Status { .. }
        )
    }

    pub(crate) fn response(message: impl Into<String>) -> Self {
        EmbedError::ResponseFormat(message.into())
    }
}

impl From<reqwest::Error> for EmbedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbedError::Timeout
        } else if err.is_connect() {
            EmbedError::Transport(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            EmbedError::ResponseFormat(err.to_string())
        } else {
            EmbedError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EmbedError {
    fn from(err: serde_json::Error) -> Self {
        EmbedError::ResponseFormat(err.to_string())
    }
}

/// Result type for embedgate-embed operations
pub type Result<T> = std::result::Result<T, EmbedError>;
