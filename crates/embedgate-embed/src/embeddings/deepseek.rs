//! DeepSeek embedding adapter
//!
//! DeepSeek-compatible gateways disagree on the embeddings path, so requests
//! go through [`EndpointDiscovery`]: the first candidate answering 200 with a
//! usable body is cached and reused until it fails.
//!
//! # Endpoint Format
//!
//! - POST one of `{base}/embeddings`, `{base}/embedding`, `{base}/v1/embeddings`,
//!   `{base}/v1/embedding`, `{base}/text-embeddings`
//! - Request: `{"input": "text", "model": "..."}` or `{"input": ["a", "b"], "model": "..."}`
//! - Response: `{"data": [{"embedding": [...]}]}` or `{"embeddings": [[...]]}`

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use super::discovery::EndpointDiscovery;
use super::provider::{DimensionProbe, Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::response::{align_batch, data_vectors, embeddings_vectors, fail_batch};
use super::transport::HttpTransport;
use crate::error::{EmbedError, Result};

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

/// Vectors from `data`, falling back to `embeddings`; an empty result is an error
fn parse_vectors(body: &Value) -> Result<Vec<Embedding>> {
    let vectors = if body.get("data").is_some() {
        data_vectors(body)?
    } else {
        embeddings_vectors(body)?
    };
    if vectors.is_empty() {
        return Err(EmbedError::response("response carries no embeddings"));
    }
    Ok(vectors)
}

/// DeepSeek embedding adapter with endpoint discovery
pub struct DeepSeekAdapter {
    http: HttpTransport,
    discovery: EndpointDiscovery,
    api_key: SecretString,
    model: String,
    dimension: DimensionProbe,
}

impl DeepSeekAdapter {
    /// Create a new DeepSeek adapter
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: HttpTransport::new(ProviderKind::DeepSeek, config)?,
            discovery: EndpointDiscovery::for_base_url(
                &config.base_url,
                config.discovery_timeout(),
            ),
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            dimension: DimensionProbe::default(),
        })
    }

    /// Discovery state for this instance
    pub fn discovery(&self) -> &EndpointDiscovery {
        &self.discovery
    }

    async fn discover(&self, input: Input<'_>) -> Result<Vec<Embedding>> {
        let http = &self.http;
        let body = EmbeddingsRequest {
            input,
            model: &self.model,
        };
        let body = &body;
        let api_key = self.api_key.expose_secret();

        self.discovery
            .run(|endpoint, timeout| async move {
                let request = http.post(&endpoint).bearer_auth(api_key).json(body);
                let value = http.send_with_timeout(request, timeout).await?;
                parse_vectors(&value)
            })
            .await
    }
}

#[async_trait]
impl EmbeddingAdapter for DeepSeekAdapter {
    async fn try_embed_one(&self, text: &str) -> Result<Embedding> {
        let vectors = self.discover(Input::One(text)).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::response("response carries no embeddings"))?;
        self.dimension.observe(ProviderKind::DeepSeek, &vector);
        Ok(vector)
    }

    async fn try_embed_many(&self, texts: &[String]) -> Vec<Result<Embedding>> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self.discover(Input::Many(texts)).await {
            Ok(vectors) => {
                if let Some(first) = vectors.first() {
                    self.dimension.observe(ProviderKind::DeepSeek, first);
                }
                align_batch(vectors, texts.len())
            }
            Err(e) => fail_batch(e, texts.len()),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::DeepSeek
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get()
    }
}

impl std::fmt::Debug for DeepSeekAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekAdapter")
            .field("discovery", &self.discovery)
            .field("model", &self.model)
            .finish()
    }
}
