//! Catalog agents: the capability set the pipeline driver runs against.

use async_trait::async_trait;
use serde_json::Value;
use shopcat_core::{AppConfig, FlatRow};

use crate::client::{
    extract_domain, normalize_store_url, store_origin, CatalogClient, FetchOptions, FetchOutcome,
};
use crate::error::ScraperError;
use crate::flatten::flatten;
use crate::stop::StopHandle;

/// A source of storefront products for one store.
#[async_trait]
pub trait CatalogAgent: Send + Sync {
    /// Store URL without trailing slashes; used as the persistence key.
    fn store_url(&self) -> &str;

    /// Verifies the catalog endpoint is reachable before any paging starts.
    async fn connect(&self) -> Result<(), ScraperError>;

    /// Fetches every page of the catalog. Never fails outright; see [`FetchOutcome`].
    async fn crawl(&self) -> FetchOutcome;

    /// Projects raw products into flat rows.
    fn extract_data(&self, raw: &[Value]) -> Vec<FlatRow>;
}

/// [`CatalogAgent`] backed by the public `products.json` endpoint.
pub struct ApiAgent {
    client: CatalogClient,
    store_url: String,
    store_domain: String,
    options: FetchOptions,
    stop: StopHandle,
}

impl ApiAgent {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidShopUrl`] if `store_url` has no usable host.
    pub fn new(
        client: CatalogClient,
        store_url: &str,
        options: FetchOptions,
    ) -> Result<Self, ScraperError> {
        store_origin(store_url)?;
        Ok(Self {
            client,
            store_url: normalize_store_url(store_url),
            store_domain: extract_domain(store_url),
            options,
            stop: StopHandle::new(),
        })
    }

    /// Builds the HTTP client and fetch options from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the client cannot be built or the URL is invalid.
    pub fn from_config(config: &AppConfig, store_url: &str) -> Result<Self, ScraperError> {
        let client = CatalogClient::from_config(config)?;
        Self::new(client, store_url, FetchOptions::from_config(config))
    }

    /// Replaces the agent's stop flag with one shared with a supervisor.
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Handle that ends the crawl before its next page request.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[must_use]
    pub fn store_domain(&self) -> &str {
        &self.store_domain
    }
}

#[async_trait]
impl CatalogAgent for ApiAgent {
    fn store_url(&self) -> &str {
        &self.store_url
    }

    async fn connect(&self) -> Result<(), ScraperError> {
        self.client.connect(&self.store_url).await
    }

    async fn crawl(&self) -> FetchOutcome {
        self.client
            .fetch_all(&self.store_url, &self.options, &self.stop)
            .await
    }

    fn extract_data(&self, raw: &[Value]) -> Vec<FlatRow> {
        flatten(raw, &self.store_domain)
    }
}
