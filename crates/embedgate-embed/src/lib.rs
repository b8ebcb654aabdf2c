//! EmbedGate Embed - one embedding interface over many providers
//!
//! This crate turns text into vectors through OpenAI-compatible services,
//! Azure OpenAI deployments, local Ollama and LM Studio servers, Gemini,
//! SiliconFlow, and DeepSeek-style gateways.
//!
//! # Features
//!
//! - **Uniform contract**: every provider implements [`EmbeddingAdapter`]
//! - **Graceful degradation**: `embed_*` never fails a call; failed positions
//!   hold empty vectors, and `try_*` exposes the cause
//! - **Endpoint discovery**: probes candidate paths and caches the working one
//! - **Rate limiting**: optional `rate-limit` feature backed by `governor`
//!
//! # Example
//!
//! ```ignore
//! use embedgate_embed::{create, ProviderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::new("openai", "sk-...", "https://api.openai.com", "text-embedding-3-small")
//!         .with_timeout(60);
//!     let adapter = create(&config)?;
//!
//!     let vectors = adapter.embed_many(&["hello".into(), "world".into()]).await;
//!     assert_eq!(vectors.len(), 2);
//!     Ok(())
//! }
//! ```

pub mod embeddings;
pub mod error;
pub mod url;

pub use embeddings::{
    create, create_embedding_adapter, AzureDeployment, AzureOpenAiAdapter, DeepSeekAdapter,
    Embedding, EmbeddingAdapter, EndpointDiscovery, GeminiAdapter, LmStudioAdapter, OllamaAdapter,
    OpenAiAdapter, ProviderConfig, ProviderKind, SiliconFlowAdapter, DEFAULT_CANDIDATE_SUFFIXES,
    DEFAULT_DISCOVERY_TIMEOUT_SECS,
};
pub use error::{EmbedError, Result};
pub use url::normalize_base_url;
