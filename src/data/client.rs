//! PokeAPI client
//!
//! Builds catalog and detail URLs, fetches them through the `CachedFetcher`,
//! and decodes the bodies into our record types.

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::fetch::{CachedFetcher, FetchError};
use super::{LocationAreaDetail, LocationAreaPage, Pokemon};

/// Base URL for PokeAPI v2
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Number of location areas per catalog page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Errors that can occur when querying the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Fetching the response failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Failed to parse JSON response
    #[error("failed to unmarshal JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the location-area and pokemon endpoints
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    fetcher: CachedFetcher,
    base_url: String,
    page_size: u32,
}

impl PokeApiClient {
    /// Create a new client against the public PokeAPI
    pub fn new(fetcher: CachedFetcher) -> Self {
        Self {
            fetcher,
            base_url: POKEAPI_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Use a different API root (mirrors, mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    /// URL of the first location-area page
    pub fn first_page_url(&self) -> String {
        format!(
            "{}/location-area/?offset=0&limit={}",
            self.base_url, self.page_size
        )
    }

    /// Fetch one page of the location-area catalog
    ///
    /// `url` is used verbatim, so the `next`/`previous` links from an earlier
    /// page can be passed straight through.
    pub async fn location_areas(&self, url: &str) -> Result<LocationAreaPage, ApiError> {
        self.get_json(url).await
    }

    /// Fetch the encounters for a single location area
    pub async fn location_area(&self, name: &str) -> Result<LocationAreaDetail, ApiError> {
        let url = format!("{}/location-area/{}", self.base_url, name);
        self.get_json(&url).await
    }

    /// Fetch a pokemon's detail record
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let url = format!("{}/pokemon/{}", self.base_url, name);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let body = self.fetcher.fetch_cached(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
