//! Embedding adapters for remote and local providers
//!
//! ```text
//! EmbeddingAdapter (trait)
//!     ├── OpenAiAdapter       - {base}/v1/embeddings, batch
//!     ├── AzureOpenAiAdapter  - deployment URL, api-key header, batch
//!     ├── OllamaAdapter       - /api/embeddings, one call per text
//!     ├── LmStudioAdapter     - {base}/v1/embeddings, batch
//!     ├── GeminiAdapter       - {model}:embedContent, key in query
//!     ├── SiliconFlowAdapter  - fixed URL, one call per text
//!     └── DeepSeekAdapter     - EndpointDiscovery over candidate paths
//! ```
//!
//! Use [`create`] to build the adapter for a [`ProviderConfig`].

pub mod azure_openai;
pub mod deepseek;
pub mod discovery;
pub mod factory;
pub mod gemini;
pub mod lm_studio;
pub mod ollama;
pub mod openai;
pub mod siliconflow;
mod provider;
mod response;
mod transport;

pub use provider::{
    Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind, DEFAULT_DISCOVERY_TIMEOUT_SECS,
};

pub use factory::{create, create_embedding_adapter};

pub use azure_openai::{AzureDeployment, AzureOpenAiAdapter};
pub use deepseek::DeepSeekAdapter;
pub use discovery::{EndpointDiscovery, DEFAULT_CANDIDATE_SUFFIXES};
pub use gemini::GeminiAdapter;
pub use lm_studio::LmStudioAdapter;
pub use ollama::OllamaAdapter;
pub use openai::OpenAiAdapter;
pub use siliconflow::SiliconFlowAdapter;
