//! Adapter factory
//!
//! Maps a provider identifier to its adapter. Construction is the only place
//! configuration errors surface; every later failure degrades per call.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;

use super::azure_openai::AzureOpenAiAdapter;
use super::deepseek::DeepSeekAdapter;
use super::gemini::GeminiAdapter;
use super::lm_studio::LmStudioAdapter;
use super::ollama::OllamaAdapter;
use super::openai::OpenAiAdapter;
use super::provider::{EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::siliconflow::SiliconFlowAdapter;

/// Create an embedding adapter from configuration
///
/// Returns an `Arc<dyn EmbeddingAdapter>` that can be shared across tasks.
///
/// # Errors
///
/// - [`EmbedError::UnknownProvider`](crate::EmbedError::UnknownProvider) if the
///   identifier is not recognized (matched case-insensitively after trimming)
/// - [`EmbedError::InvalidDeploymentUrl`](crate::EmbedError::InvalidDeploymentUrl)
///   for an Azure OpenAI base URL that is not a deployment URL
///
/// # Example
///
/// ```ignore
/// use embedgate_embed::{create, ProviderConfig};
///
/// let config = ProviderConfig::new("Ollama", "", "http://localhost:11434", "nomic-embed-text");
/// let adapter = create(&config)?;
/// println!("Using {} provider", adapter.provider());
/// ```
pub fn create(config: &ProviderConfig) -> Result<Arc<dyn EmbeddingAdapter>> {
    let kind: ProviderKind = config.provider.parse()?;

    let adapter: Arc<dyn EmbeddingAdapter> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiAdapter::new(config)?),
        ProviderKind::AzureOpenAi => Arc::new(AzureOpenAiAdapter::new(config)?),
        ProviderKind::Ollama => Arc::new(OllamaAdapter::new(config)?),
        ProviderKind::LmStudio => Arc::new(LmStudioAdapter::new(config)?),
        ProviderKind::Gemini => Arc::new(GeminiAdapter::new(config)?),
        ProviderKind::SiliconFlow => Arc::new(SiliconFlowAdapter::new(config)?),
        ProviderKind::DeepSeek => Arc::new(DeepSeekAdapter::new(config)?),
    };

    debug!(provider = %kind, model = %config.model_name, "Created embedding adapter");
    Ok(adapter)
}

/// Create an adapter from the four connection parameters
///
/// No request timeout is applied; use [`create`] with
/// [`ProviderConfig::with_timeout`] to bound calls.
pub fn create_embedding_adapter(
    provider_id: &str,
    api_key: &str,
    base_url: &str,
    model_name: &str,
) -> Result<Arc<dyn EmbeddingAdapter>> {
    create(&ProviderConfig::new(provider_id, api_key, base_url, model_name))
}
