//! Ollama embedding adapter
//!
//! Talks to the native Ollama API rather than its OpenAI shim. One request is
//! sent per text.
//!
//! # Endpoint Format
//!
//! - POST `{base}/api/embeddings`
//! - Request: `{"model": "...", "prompt": "..."}`
//! - Response: `{"embedding": [...]}`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::provider::{DimensionProbe, Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::transport::HttpTransport;
use crate::error::{EmbedError, Result};

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Option<Embedding>,
}

/// Resolve the `/api/embeddings` URL from whatever base the user configured
///
/// - `.../api/embeddings` is used as is
/// - `.../api` gains `/embeddings`
/// - an OpenAI-style `.../v1` suffix is dropped before appending `/api/embeddings`
pub fn embeddings_url(base_url: &str) -> String {
    let url = base_url.trim().trim_end_matches('/');
    let (origin, path) = url.split_at(crate::url::path_start(url));
    if path.contains("/api/embeddings") {
        return url.to_string();
    }
    if path.contains("/api") {
        return format!("{}/embeddings", url);
    }
    let path = match path.find("/v1") {
        Some(index) => &path[..index],
        None => path,
    };
    format!("{}{}/api/embeddings", origin, path)
}

/// Ollama embedding adapter
pub struct OllamaAdapter {
    http: HttpTransport,
    url: String,
    model: String,
    dimension: DimensionProbe,
}

impl OllamaAdapter {
    /// Create a new Ollama adapter (no authentication)
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: HttpTransport::new(ProviderKind::Ollama, config)?,
            url: embeddings_url(&config.base_url),
            model: config.model_name.clone(),
            dimension: DimensionProbe::default(),
        })
    }

    /// Resolved embeddings URL
    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaAdapter {
    async fn try_embed_one(&self, text: &str) -> Result<Embedding> {
        let request = self.http.post(&self.url).json(&EmbeddingsRequest {
            model: &self.model,
            prompt: text,
        });
        let value = self.http.send(request).await?;
        let response: EmbeddingsResponse = serde_json::from_value(value)?;
        let vector = response
            .embedding
            .ok_or_else(|| EmbedError::response("no 'embedding' field in Ollama response"))?;
        self.dimension.observe(ProviderKind::Ollama, &vector);
        Ok(vector)
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get()
    }
}

impl std::fmt::Debug for OllamaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaAdapter")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}
