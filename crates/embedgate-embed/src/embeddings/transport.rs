//! Shared HTTP plumbing for the adapters
//!
//! Wraps a `reqwest::Client` with the configured timeout, optional rate
//! limiting, and status/JSON handling common to every provider.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

#[cfg(feature = "rate-limit")]
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
#[cfg(feature = "rate-limit")]
use std::num::NonZeroU32;
#[cfg(feature = "rate-limit")]
use std::sync::Arc;

use super::provider::{ProviderConfig, ProviderKind};
use crate::error::{EmbedError, Result};

/// Default requests per second limit
#[cfg(feature = "rate-limit")]
const DEFAULT_REQUESTS_PER_SECOND: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Longest error body kept in error messages
const MAX_ERROR_BODY: usize = 512;

/// Type alias for the rate limiter
#[cfg(feature = "rate-limit")]
type AdapterRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client shared by one adapter instance
#[derive(Clone)]
pub(crate) struct HttpTransport {
    client: Client,
    provider: ProviderKind,
    #[cfg(feature = "rate-limit")]
    rate_limiter: Arc<AdapterRateLimiter>,
}

impl HttpTransport {
    /// Build the client for a provider from its configuration
    pub(crate) fn new(provider: ProviderKind, config: &ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder();
        match config.timeout() {
            Some(timeout) => builder = builder.timeout(timeout),
            None => warn!(
                provider = %provider,
                "No request timeout configured; calls may block indefinitely"
            ),
        }
        let client = builder
            .build()
            .map_err(|e| EmbedError::InvalidConfig(format!("HTTP client error: {}", e)))?;

        #[cfg(feature = "rate-limit")]
        let rate_limiter = {
            let rps = config
                .requests_per_second
                .and_then(NonZeroU32::new)
                .unwrap_or(DEFAULT_REQUESTS_PER_SECOND);
            Arc::new(RateLimiter::direct(Quota::per_second(rps)))
        };

        Ok(Self {
            client,
            provider,
            #[cfg(feature = "rate-limit")]
            rate_limiter,
        })
    }

    /// Start a POST request
    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Wait for rate limiter permission (when feature enabled)
    #[cfg(feature = "rate-limit")]
    async fn wait_for_permit(&self) {
        self.rate_limiter.until_ready().await;
    }

    /// No-op when rate limiting is disabled
    #[cfg(not(feature = "rate-limit"))]
    async fn wait_for_permit(&self) {}

    /// Send a request and return the JSON body of any 2xx response
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Value> {
        self.send_logged(request, None, Accept::AnySuccess).await
    }

    /// Send a discovery probe with an explicit timeout
    ///
    /// Only an HTTP 200 confirms a candidate endpoint; other 2xx codes fail.
    pub(crate) async fn send_with_timeout(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Value> {
        self.send_logged(request.timeout(timeout), Some(timeout), Accept::OkOnly)
            .await
    }

    async fn send_logged(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
        accept: Accept,
    ) -> Result<Value> {
        self.wait_for_permit().await;

        let request = request.build()?;
        debug!(
            provider = %self.provider,
            url = %redact(request.url()),
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "Sending embedding request"
        );

        let response = self.client.execute(request).await?;
        let status = response.status();

        match status {
            _ if accept.allows(status) => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| {
                    EmbedError::response(format!("Body is not JSON ({}): {}", e, truncate(&body)))
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(EmbedError::Auth {
                    status: status.as_u16(),
                    body: truncate(&body),
                })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(EmbedError::Status {
                    status: status.as_u16(),
                    body: truncate(&body),
                })
            }
        }
    }
}

/// Which response statuses count as success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    AnySuccess,
    OkOnly,
}

impl Accept {
    fn allows(self, status: StatusCode) -> bool {
        match self {
            Accept::AnySuccess => status.is_success(),
            Accept::OkOnly => status == StatusCode::OK,
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("provider", &self.provider)
            .finish()
    }
}

/// Drop the query string (it may carry an API key) for logging
fn redact(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    if url.query().is_some() {
        url.set_query(Some("redacted"));
    }
    url.to_string()
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
