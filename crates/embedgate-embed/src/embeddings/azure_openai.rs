//! Azure OpenAI embedding adapter
//!
//! Azure addresses a model through a deployment, so the configured base URL is
//! the full embeddings URL copied from the Azure portal:
//!
//! `https://{resource}.openai.azure.com/openai/deployments/{deployment}/embeddings?api-version={version}`
//!
//! The URL is parsed at construction; anything else is a configuration error.
//!
//! # Endpoint Format
//!
//! - POST `{endpoint}/openai/deployments/{deployment}/embeddings?api-version={version}`
//! - Header: `api-key: {key}` (the key is never sent as `Authorization: Bearer`)
//! - Request: `{"input": ["text1", ...]}`
//! - Response: `{"data": [{"embedding": [...], "index": 0}, ...]}`

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use super::provider::{DimensionProbe, Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::response::{align_batch, data_vectors, fail_batch, first_data_vector};
use super::transport::HttpTransport;
use crate::error::{EmbedError, Result};

static DEPLOYMENT_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(.+?)/openai/deployments/(.+?)/embeddings\?api-version=(.+)$")
        .expect("deployment URL pattern is valid")
});

/// Components of an Azure OpenAI deployment URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureDeployment {
    /// Scheme and host, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    /// Deployment name
    pub deployment: String,
    /// `api-version` query value
    pub api_version: String,
}

impl AzureDeployment {
    /// Parse a full deployment embeddings URL
    pub fn parse(url: &str) -> Result<Self> {
        let captures = DEPLOYMENT_URL
            .captures(url.trim())
            .ok_or_else(|| EmbedError::InvalidDeploymentUrl(url.to_string()))?;
        Ok(Self {
            endpoint: format!("https://{}", &captures[1]),
            deployment: captures[2].to_string(),
            api_version: captures[3].to_string(),
        })
    }

    /// Embeddings URL for this deployment
    pub fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a [String],
}

/// Azure OpenAI embedding adapter
pub struct AzureOpenAiAdapter {
    http: HttpTransport,
    deployment: AzureDeployment,
    url: String,
    api_key: SecretString,
    model: String,
    dimension: DimensionProbe,
}

impl AzureOpenAiAdapter {
    /// Create from a config whose base URL is a deployment URL
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let deployment = AzureDeployment::parse(&config.base_url)?;
        Self::with_deployment(deployment, config)
    }

    /// Create from an already parsed deployment
    pub fn with_deployment(deployment: AzureDeployment, config: &ProviderConfig) -> Result<Self> {
        let http = HttpTransport::new(ProviderKind::AzureOpenAi, config)?;
        let url = deployment.embeddings_url();
        let model = if config.model_name.is_empty() {
            deployment.deployment.clone()
        } else {
            config.model_name.clone()
        };
        Ok(Self {
            http,
            deployment,
            url,
            api_key: config.api_key.clone(),
            model,
            dimension: DimensionProbe::default(),
        })
    }

    /// Parsed deployment
    pub fn deployment(&self) -> &AzureDeployment {
        &self.deployment
    }

    async fn request(&self, input: &[String]) -> Result<Value> {
        let request = self
            .http
            .post(&self.url)
            .header("api-key", self.api_key.expose_secret())
            .json(&EmbeddingsRequest { input });
        self.http.send(request).await
    }
}

#[async_trait]
impl EmbeddingAdapter for AzureOpenAiAdapter {
    async fn try_embed_one(&self, text: &str) -> Result<Embedding> {
        let value = self.request(&[text.to_string()]).await?;
        let vector = first_data_vector(&value)?;
        self.dimension.observe(ProviderKind::AzureOpenAi, &vector);
        Ok(vector)
    }

    async fn try_embed_many(&self, texts: &[String]) -> Vec<Result<Embedding>> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self.request(texts).await.and_then(|value| data_vectors(&value)) {
            Ok(vectors) => {
                if let Some(first) = vectors.first() {
                    self.dimension.observe(ProviderKind::AzureOpenAi, first);
                }
                align_batch(vectors, texts.len())
            }
            Err(e) => fail_batch(e, texts.len()),
        }
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::AzureOpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get()
    }
}

impl std::fmt::Debug for AzureOpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiAdapter")
            .field("deployment", &self.deployment)
            .finish()
    }
}
