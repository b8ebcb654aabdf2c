//! OpenAI-compatible embedding adapter
//!
//! # Endpoint Format
//!
//! - POST `{normalized base}/embeddings`, where the base gains `/v1` if it has no version segment
//! - Request: `{"model": "...", "input": ["text1", "text2", ...]}`
//! - Response: `{"data": [{"embedding": [...], "index": 0}, ...], ...}`
//!
//! # Example
//!
//! ```ignore
//! use embedgate_embed::{EmbeddingAdapter, OpenAiAdapter, ProviderConfig};
//!
//! let config = ProviderConfig::new("openai", "sk-...", "https://api.openai.com", "text-embedding-3-small")
//!     .with_timeout(60);
//! let adapter = OpenAiAdapter::new(&config)?;
//! let vector = adapter.embed_one("hello world").await;
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use super::provider::{DimensionProbe, Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::response::{align_batch, data_vectors, fail_batch, first_data_vector};
use super::transport::HttpTransport;
use crate::error::Result;
use crate::url::{join, normalize_base_url};

/// Request body for the `/v1/embeddings` endpoint
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// OpenAI-compatible embedding adapter
pub struct OpenAiAdapter {
    http: HttpTransport,
    url: String,
    api_key: SecretString,
    model: String,
    dimension: DimensionProbe,
}

impl OpenAiAdapter {
    /// Create a new OpenAI-compatible adapter
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = HttpTransport::new(ProviderKind::OpenAi, config)?;
        Ok(Self {
            http,
            url: join(&normalize_base_url(&config.base_url), "embeddings"),
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            dimension: DimensionProbe::default(),
        })
    }

    /// Embeddings endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.url
    }

    async fn request(&self, input: &[String]) -> Result<Value> {
        let body = EmbeddingsRequest {
            model: &self.model,
            input,
        };
        let request = self
            .http
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body);
        self.http.send(request).await
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiAdapter {
    async fn try_embed_one(&self, text: &str) -> Result<Embedding> {
        let value = self.request(&[text.to_string()]).await?;
        let vector = first_data_vector(&value)?;
        self.dimension.observe(ProviderKind::OpenAi, &vector);
        Ok(vector)
    }

    async fn try_embed_many(&self, texts: &[String]) -> Vec<Result<Embedding>> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self.request(texts).await.and_then(|value| data_vectors(&value)) {
            Ok(vectors) => {
                if let Some(first) = vectors.first() {
                    self.dimension.observe(ProviderKind::OpenAi, first);
                }
                align_batch(vectors, texts.len())
            }
            Err(e) => fail_batch(e, texts.len()),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get()
    }
}

impl std::fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}
