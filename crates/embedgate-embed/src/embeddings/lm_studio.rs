//! LM Studio local server adapter
//!
//! LM Studio serves an OpenAI-style API, but a single text is sent as a plain
//! string rather than a one-element list.
//!
//! # Endpoint Format
//!
//! - POST `{normalized base}/embeddings`
//! - Request: `{"input": "text", "model": "..."}` or `{"input": ["a", "b"], "model": "..."}`
//! - Response: `{"data": [{"embedding": [...]}, ...]}`

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use super::provider::{DimensionProbe, Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::response::{align_batch, data_vectors, fail_batch, first_data_vector};
use super::transport::HttpTransport;
use crate::error::Result;
use crate::url::{join, normalize_base_url};

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Input<'a> {
    One(&'a str),
    Many(&'a [String]),
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: Input<'a>,
    model: &'a str,
}

/// Embeddings URL under a normalized base, unless the base already points at it
fn embeddings_url(base_url: &str) -> String {
    let base = normalize_base_url(base_url);
    if base.trim_end_matches('/').ends_with("/embeddings") {
        base
    } else {
        join(&base, "embeddings")
    }
}

/// LM Studio embedding adapter
pub struct LmStudioAdapter {
    http: HttpTransport,
    url: String,
    api_key: SecretString,
    model: String,
    dimension: DimensionProbe,
}

impl LmStudioAdapter {
    /// Create a new LM Studio adapter
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: HttpTransport::new(ProviderKind::LmStudio, config)?,
            url: embeddings_url(&config.base_url),
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            dimension: DimensionProbe::default(),
        })
    }

    /// Embeddings endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.url
    }

    async fn request(&self, input: Input<'_>) -> Result<Value> {
        let request = self
            .http
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingsRequest {
                input,
                model: &self.model,
            });
        self.http.send(request).await
    }
}

#[async_trait]
impl EmbeddingAdapter for LmStudioAdapter {
    async fn try_embed_one(&self, text: &str) -> Result<Embedding> {
        let value = self.request(Input::One(text)).await?;
        let vector = first_data_vector(&value)?;
        self.dimension.observe(ProviderKind::LmStudio, &vector);
        Ok(vector)
    }

    async fn try_embed_many(&self, texts: &[String]) -> Vec<Result<Embedding>> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self
            .request(Input::Many(texts))
            .await
            .and_then(|value| data_vectors(&value))
        {
            Ok(vectors) => {
                if let Some(first) = vectors.first() {
                    self.dimension.observe(ProviderKind::LmStudio, first);
                }
                align_batch(vectors, texts.len())
            }
            Err(e) => fail_batch(e, texts.len()),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::LmStudio
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get()
    }
}

impl std::fmt::Debug for LmStudioAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmStudioAdapter")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}
