//! Cache-aware HTTP fetching
//!
//! `CachedFetcher` serves a URL from the response cache when it can and falls
//! back to a network GET otherwise, storing only successful bodies.

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::cache::ResponseCache;

/// Errors that can occur while fetching a response body
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("failed to fetch data: {0}")]
    Request(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("failed to fetch data: {url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// Reading the response body failed
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Fetches raw response bodies through a shared `ResponseCache`
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    client: Client,
    cache: Arc<ResponseCache>,
}

impl CachedFetcher {
    /// Creates a fetcher with a default HTTP client
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self::with_client(Client::new(), cache)
    }

    /// Creates a fetcher with a custom HTTP client
    pub fn with_client(client: Client, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// The cache this fetcher reads from and writes to
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Returns the body for `url`, from the cache on a hit or the network on a miss
    ///
    /// # Returns
    /// * `Ok(Bytes)` - The cached or freshly fetched body
    /// * `Err(FetchError)` - If the request, status, or body read fails; nothing is cached
    pub async fn fetch_cached(&self, url: &str) -> Result<Bytes, FetchError> {
        if let Some(body) = self.cache.get(url) {
            debug!(%url, "using cached data");
            return Ok(body);
        }

        debug!(%url, "fetching data");
        let response = self.client.get(url).send().await.map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        self.cache.add(url, body.clone());

        Ok(body)
    }
}
