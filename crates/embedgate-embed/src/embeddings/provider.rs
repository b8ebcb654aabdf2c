//! Embedding adapter trait and shared types
//!
//! Every provider variant implements [`EmbeddingAdapter`]:
//! - `OpenAiAdapter` - OpenAI-compatible `/v1/embeddings`
//! - `AzureOpenAiAdapter` - Azure OpenAI deployment URL
//! - `OllamaAdapter` - local Ollama daemon `/api/embeddings`
//! - `LmStudioAdapter` - LM Studio local server
//! - `GeminiAdapter` - Google Generative Language `:embedContent`
//! - `SiliconFlowAdapter` - SiliconFlow fixed-body endpoint
//! - `DeepSeekAdapter` - endpoint discovery over candidate paths

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::warn;

use crate::error::{EmbedError, Result};

/// A single embedding vector. Empty means "no vector".
pub type Embedding = Vec<f32>;

/// Default per-attempt timeout for endpoint discovery, in seconds
pub const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 30;

/// Embedding provider variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI or any OpenAI-compatible API
    OpenAi,
    /// Azure OpenAI, addressed by a full deployment URL
    AzureOpenAi,
    /// Local Ollama daemon
    Ollama,
    /// LM Studio local server
    LmStudio,
    /// Google Gemini (API key in the URL)
    Gemini,
    /// SiliconFlow
    SiliconFlow,
    /// DeepSeek (embedding path discovered at runtime)
    DeepSeek,
}

impl ProviderKind {
    /// All variants, in display order
    pub const ALL: [ProviderKind; 7] = [
        ProviderKind::OpenAi,
        ProviderKind::AzureOpenAi,
        ProviderKind::Ollama,
        ProviderKind::LmStudio,
        ProviderKind::Gemini,
        ProviderKind::SiliconFlow,
        ProviderKind::DeepSeek,
    ];

    /// Canonical identifier accepted by the factory
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::AzureOpenAi => "azure openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::LmStudio => "ml studio",
            ProviderKind::Gemini => "gemini",
            ProviderKind::SiliconFlow => "siliconflow",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Additional spellings that resolve to this variant
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::OpenAi => &[],
            ProviderKind::AzureOpenAi => &["azure-openai", "azure_openai", "azure"],
            ProviderKind::Ollama => &[],
            ProviderKind::LmStudio => &["lm studio", "lm-studio", "lmstudio"],
            ProviderKind::Gemini => &["google"],
            ProviderKind::SiliconFlow => &["silicon flow"],
            ProviderKind::DeepSeek => &[],
        }
    }

    /// One-line description for listings
    pub fn description(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI-compatible API, POST {base}/v1/embeddings",
            ProviderKind::AzureOpenAi => {
                "Azure OpenAI, base URL is the full deployment embeddings URL"
            }
            ProviderKind::Ollama => "Local Ollama daemon, POST {base}/api/embeddings",
            ProviderKind::LmStudio => "LM Studio local server, OpenAI-style /v1/embeddings",
            ProviderKind::Gemini => "Google Gemini, POST {base}/{model}:embedContent?key=...",
            ProviderKind::SiliconFlow => "SiliconFlow, single fixed embeddings endpoint",
            ProviderKind::DeepSeek => "DeepSeek, embedding path discovered from candidates",
        }
    }

    /// Whether requests carry an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.id() == normalized || kind.aliases().contains(&normalized.as_str()))
            .ok_or_else(|| EmbedError::UnknownProvider(s.to_string()))
    }
}

/// Configuration an adapter is built from
///
/// Immutable once handed to the factory.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier, e.g. "openai" or "azure openai"
    pub provider: String,
    /// API key (ignored by providers that do not authenticate)
    pub api_key: SecretString,
    /// Base URL, or the full deployment URL for Azure OpenAI
    pub base_url: String,
    /// Model name
    pub model_name: String,
    /// Request timeout in seconds (None = no client-side timeout)
    pub timeout_secs: Option<u64>,
    /// Per-attempt timeout for endpoint discovery
    pub discovery_timeout_secs: u64,
    /// Requests per second limit (honored with the `rate-limit` feature)
    pub requests_per_second: Option<u32>,
}

impl ProviderConfig {
    /// Create a config with no request timeout and the default discovery timeout
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key: SecretString::new(api_key.into()),
            base_url: base_url.into(),
            model_name: model_name.into(),
            timeout_secs: None,
            discovery_timeout_secs: DEFAULT_DISCOVERY_TIMEOUT_SECS,
            requests_per_second: None,
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set per-attempt discovery timeout
    pub fn with_discovery_timeout(mut self, timeout_secs: u64) -> Self {
        self.discovery_timeout_secs = timeout_secs;
        self
    }

    /// Set requests per second limit
    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = Some(rps);
        self
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Discovery attempt timeout, never longer than the request timeout
    pub fn discovery_timeout(&self) -> Duration {
        let attempt = Duration::from_secs(self.discovery_timeout_secs);
        match self.timeout() {
            Some(request) if request < attempt => request,
            _ => attempt,
        }
    }
}

/// Records the vector dimension seen in the first successful response.
#[derive(Debug, Default)]
pub(crate) struct DimensionProbe(AtomicUsize);

impl DimensionProbe {
    pub(crate) fn observe(&self, provider: ProviderKind, vector: &[f32]) {
        if vector.is_empty() {
            return;
        }
        let dim = vector.len();
        match self
            .0
            .compare_exchange(0, dim, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => {}
            Err(known) if known != dim => {
                warn!(
                    provider = %provider,
                    expected = known,
                    actual = dim,
                    "Embedding dimension changed between responses"
                );
            }
            Err(_) => {}
        }
    }

    pub(crate) fn get(&self) -> Option<usize> {
        match self.0.load(Ordering::Relaxed) {
            0 => None,
            dim => Some(dim),
        }
    }
}

/// Embedding adapter trait
///
/// Turns text into vectors through one provider's wire protocol.
///
/// Two layers are exposed:
/// - `try_embed_one` / `try_embed_many` return the underlying error for each
///   position. Implementors provide these.
/// - `embed_one` / `embed_many` degrade every per-call failure to an empty
///   vector and log it. Batch results always have the same length and order
///   as the input.
///
/// Calls on one instance are processed sequentially; items in a batch are
/// never fanned out. Adapters are `Send + Sync` and can be shared behind an
/// `Arc`, with any mutable state (the discovery cache) guarded internally.
#[async_trait]
pub trait EmbeddingAdapter: Send + Sync + std::fmt::Debug {
    /// Embed one text, reporting the failure cause
    async fn try_embed_one(&self, text: &str) -> Result<Embedding>;

    /// Embed an ordered batch, one result per input
    ///
    /// Default implementation calls `try_embed_one` for each text in order.
    async fn try_embed_many(&self, texts: &[String]) -> Vec<Result<Embedding>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.try_embed_one(text).await);
        }
        results
    }

    /// Embed one text; any failure yields an empty vector
    async fn embed_one(&self, text: &str) -> Embedding {
        match self.try_embed_one(text).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(
                    provider = %self.provider(),
                    error = %e,
                    "Embedding request failed, returning empty vector"
                );
                Vec::new()
            }
        }
    }

    /// Embed an ordered batch; failed positions hold empty vectors
    async fn embed_many(&self, texts: &[String]) -> Vec<Embedding> {
        let provider = self.provider();
        self.try_embed_many(texts)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(vector) => vector,
                Err(e) => {
                    warn!(
                        provider = %provider,
                        index,
                        error = %e,
                        "Batch item failed, returning empty vector"
                    );
                    Vec::new()
                }
            })
            .collect()
    }

    /// Provider variant
    fn provider(&self) -> ProviderKind;

    /// Model name sent to the provider
    fn model(&self) -> &str;

    /// Dimension detected from the first successful response
    fn dimension(&self) -> Option<usize>;
}
