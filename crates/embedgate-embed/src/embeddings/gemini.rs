//! Google Gemini embedding adapter
//!
//! The API key travels as the `key` query parameter. Request URLs are logged
//! through the transport, which redacts it.
//!
//! # Endpoint Format
//!
//! - POST `{base}/{model}:embedContent?key={api_key}`
//! - Request: `{"model": "...", "content": {"parts": [{"text": "..."}]}}`
//! - Response: `{"embedding": {"values": [...]}}`

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::provider::{DimensionProbe, Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::transport::HttpTransport;
use crate::error::{EmbedError, Result};

/// Base used when none is configured
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Embedding,
}

/// Gemini embedding adapter
pub struct GeminiAdapter {
    http: HttpTransport,
    url: String,
    api_key: SecretString,
    model: String,
    dimension: DimensionProbe,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let base = config.base_url.trim().trim_end_matches('/');
        let base = if base.is_empty() {
            DEFAULT_GEMINI_BASE_URL
        } else {
            base
        };
        Ok(Self {
            http: HttpTransport::new(ProviderKind::Gemini, config)?,
            url: format!("{}/{}:embedContent", base, config.model_name),
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            dimension: DimensionProbe::default(),
        })
    }

    /// Endpoint URL without the key parameter
    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EmbeddingAdapter for GeminiAdapter {
    async fn try_embed_one(&self, text: &str) -> Result<Embedding> {
        let request = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&EmbedContentRequest {
                model: &self.model,
                content: Content {
                    parts: [Part { text }],
                },
            });
        let value = self.http.send(request).await?;
        let response: EmbedContentResponse = serde_json::from_value(value)?;
        let vector = response
            .embedding
            .map(|embedding| embedding.values)
            .ok_or_else(|| EmbedError::response("no 'embedding' object in Gemini response"))?;
        self.dimension.observe(ProviderKind::Gemini, &vector);
        Ok(vector)
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get()
    }
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}
