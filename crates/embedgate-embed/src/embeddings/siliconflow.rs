//! SiliconFlow embedding adapter
//!
//! The configured base URL is the full embeddings URL. A missing scheme is
//! filled in with `https://`, and an empty base falls back to the public
//! endpoint.
//!
//! # Endpoint Format
//!
//! - POST `{url}`
//! - Request: `{"model": "...", "input": "text", "encoding_format": "float"}`
//! - Response: `{"data": [{"embedding": [...]}]}`

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::provider::{DimensionProbe, Embedding, EmbeddingAdapter, ProviderConfig, ProviderKind};
use super::response::first_data_vector;
use super::transport::HttpTransport;
use crate::error::Result;

/// Public SiliconFlow embeddings endpoint
pub const DEFAULT_SILICONFLOW_URL: &str = "https://api.siliconflow.cn/v1/embeddings";

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'static str,
}

fn endpoint_url(base_url: &str) -> String {
    let base = base_url.trim();
    if base.is_empty() {
        DEFAULT_SILICONFLOW_URL.to_string()
    } else if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("https://{}", base)
    }
}

/// SiliconFlow embedding adapter
pub struct SiliconFlowAdapter {
    http: HttpTransport,
    url: String,
    api_key: SecretString,
    model: String,
    dimension: DimensionProbe,
}

impl SiliconFlowAdapter {
    /// Create a new SiliconFlow adapter
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: HttpTransport::new(ProviderKind::SiliconFlow, config)?,
            url: endpoint_url(&config.base_url),
            api_key: config.api_key.clone(),
            model: config.model_name.clone(),
            dimension: DimensionProbe::default(),
        })
    }

    /// Embeddings endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EmbeddingAdapter for SiliconFlowAdapter {
    async fn try_embed_one(&self, text: &str) -> Result<Embedding> {
        let request = self
            .http
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingsRequest {
                model: &self.model,
                input: text,
                encoding_format: "float",
            });
        let value = self.http.send(request).await?;
        let vector = first_data_vector(&value)?;
        self.dimension.observe(ProviderKind::SiliconFlow, &vector);
        Ok(vector)
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::SiliconFlow
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get()
    }
}

impl std::fmt::Debug for SiliconFlowAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiliconFlowAdapter")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbedError;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_url() {
        assert_eq!(endpoint_url(""), DEFAULT_SILICONFLOW_URL);
        assert_eq!(endpoint_url("  "), DEFAULT_SILICONFLOW_URL);
        assert_eq!(
            endpoint_url("api.siliconflow.cn/v1/embeddings"),
            "https://api.siliconflow.cn/v1/embeddings"
        );
        assert_eq!(endpoint_url("http://local:8080/emb"), "http://local:8080/emb");
    }

    #[tokio::test]
    async fn test_per_text_requests() {
        let server = MockServer::start().await;

        for (text, value) in [("a", 1.0), ("b", 2.0)] {
            Mock::given(method("POST"))
                .and(path("/v1/embeddings"))
                .and(header("Authorization", "Bearer sf-key"))
                .and(body_json(serde_json::json!({
                    "model": "BAAI/bge-m3",
                    "input": text,
                    "encoding_format": "float"
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "data": [{"embedding": [value]}]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let config = ProviderConfig::new(
            "siliconflow",
            "sf-key",
            format!("{}/v1/embeddings", server.uri()),
            "BAAI/bge-m3",
        )
        .with_timeout(5);
        let adapter = SiliconFlowAdapter::new(&config).unwrap();
        let vectors = adapter
            .embed_many(&["a".to_string(), "b".to_string()])
            .await;
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
    }

    #[tokio::test]
    async fn test_empty_data_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let config = ProviderConfig::new("siliconflow", "k", server.uri(), "m").with_timeout(5);
        let adapter = SiliconFlowAdapter::new(&config).unwrap();

        let err = adapter.try_embed_one("x").await.unwrap_err();
        assert!(matches!(err, EmbedError::ResponseFormat(_)));
    }
}
