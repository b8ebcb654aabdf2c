//! Endpoint discovery with a cached working endpoint
//!
//! Some providers do not document a stable embedding path. Discovery keeps an
//! ordered list of candidate URLs, built once, and remembers the first one that
//! answered successfully. The cached endpoint is tried first on every call; if
//! it fails, the cache is cleared and the whole list is probed again from the
//! top.
//!
//! The cache lives behind an async mutex that is held for the whole call, so
//! concurrent calls on one adapter are serialized and cannot interleave their
//! probing.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{EmbedError, Result};
use crate::url;

/// Path suffixes probed under the base URL, most likely first
pub const DEFAULT_CANDIDATE_SUFFIXES: [&str; 5] = [
    "embeddings",
    "embedding",
    "v1/embeddings",
    "v1/embedding",
    "text-embeddings",
];

/// Ordered candidate endpoints plus the confirmed-working one
#[derive(Debug)]
pub struct EndpointDiscovery {
    candidates: Vec<String>,
    /// Index into `candidates` of the last endpoint that succeeded
    working: Mutex<Option<usize>>,
    attempt_timeout: Duration,
}

impl EndpointDiscovery {
    /// Create from an explicit candidate list
    pub fn new(candidates: Vec<String>, attempt_timeout: Duration) -> Self {
        Self {
            candidates,
            working: Mutex::new(None),
            attempt_timeout,
        }
    }

    /// Build the default candidate list under a base URL
    pub fn for_base_url(base_url: &str, attempt_timeout: Duration) -> Self {
        let base = base_url.trim().trim_end_matches('/');
        let candidates = DEFAULT_CANDIDATE_SUFFIXES
            .iter()
            .map(|suffix| url::join(base, suffix))
            .collect();
        Self::new(candidates, attempt_timeout)
    }

    /// Candidate endpoints in priority order
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Per-attempt timeout
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Currently cached endpoint, if any
    pub async fn working_endpoint(&self) -> Option<String> {
        let working = self.working.lock().await;
        (*working).map(|index| self.candidates[index].clone())
    }

    /// Run one logical call against the cached endpoint or, failing that,
    /// each candidate in order.
    ///
    /// `attempt` receives the endpoint URL and the per-attempt timeout and
    /// must return `Ok` only for a usable response. Returns
    /// [`EmbedError::DiscoveryExhausted`] when nothing succeeds.
    pub async fn run<T, F, Fut>(&self, attempt: F) -> Result<T>
    where
        F: Fn(String, Duration) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let mut working = self.working.lock().await;

        if let Some(index) = *working {
            let endpoint = &self.candidates[index];
            match attempt(endpoint.clone(), self.attempt_timeout).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        endpoint = %endpoint,
                        error = %e,
                        "Cached endpoint failed, rediscovering"
                    );
                    *working = None;
                }
            }
        }

        let mut last_error = None;
        for (index, endpoint) in self.candidates.iter().enumerate() {
            info!(endpoint = %endpoint, "Trying embedding endpoint");
            match attempt(endpoint.clone(), self.attempt_timeout).await {
                Ok(value) => {
                    info!(endpoint = %endpoint, "Embedding endpoint confirmed");
                    *working = Some(index);
                    return Ok(value);
                }
                Err(e) => {
                    debug!(endpoint = %endpoint, error = %e, "Endpoint failed");
                    last_error = Some(e);
                }
            }
        }

        warn!(
            attempted = self.candidates.len(),
            "All embedding endpoints failed"
        );
        Err(EmbedError::DiscoveryExhausted {
            attempted: self.candidates.len(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidate endpoints".into()),
        })
    }
}
