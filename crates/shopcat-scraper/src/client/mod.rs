//! HTTP client for the storefront `products.json` endpoint.

mod fetch_all;
mod origin;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use shopcat_core::{AppConfig, ShopifyCredentials};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use fetch_all::{FetchOptions, FetchOutcome};
pub use origin::{extract_domain, normalize_store_url, store_origin};

/// Hard ceiling on pages per fetch session, for servers that never return a
/// short page.
pub const MAX_PAGES: usize = 200;

/// HTTP client for the storefront catalog endpoint.
///
/// Non-2xx responses map to typed errors (429, 404, everything else). Bodies
/// must be a JSON object with a `products` array; the array elements are
/// returned undecoded so callers can isolate per-product failures.
pub struct CatalogClient {
    client: Client,
    credentials: Option<ShopifyCredentials>,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// Creates a `CatalogClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `max_retries = 0` disables retries: any failed request is final.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            credentials: None,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the scraper settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )?;
        Ok(client.with_credentials(config.credentials.clone()))
    }

    /// Attaches HTTP basic credentials to every request.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<ShopifyCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Pre-flight probe: one `GET {origin}/products.json` without paging.
    ///
    /// Succeeds only when the status is exactly 200 and the body is a JSON
    /// object containing a `products` key. No retries.
    ///
    /// # Errors
    ///
    /// Every failure is reported as [`ScraperError::Connectivity`] with the
    /// underlying cause in `reason`.
    pub async fn connect(&self, store_url: &str) -> Result<(), ScraperError> {
        let connectivity = |reason: String| ScraperError::Connectivity {
            store_url: store_url.to_owned(),
            reason,
        };

        let url =
            Self::products_url(store_url, None, None).map_err(|e| connectivity(e.to_string()))?;
        tracing::info!(%url, "probing catalog endpoint");

        let (status, body) = self
            .get_json(&url, store_url)
            .await
            .map_err(|e| connectivity(e.to_string()))?;

        if status != StatusCode::OK {
            return Err(connectivity(format!("expected status 200, got {status}")));
        }

        products_array(body, &url).map_err(|e| connectivity(e.to_string()))?;
        tracing::info!(%url, "catalog endpoint reachable");
        Ok(())
    }

    /// Fetches one page of products, with retries per the client's policy.
    ///
    /// Returns the raw JSON elements of the `products` array.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] for HTTP 429.
    /// - [`ScraperError::NotFound`] for HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`ScraperError::Http`] for network or TLS failures.
    /// - [`ScraperError::Deserialize`] when the body is not JSON.
    /// - [`ScraperError::InvalidResponse`] when the body is not an object
    ///   with a `products` array.
    pub async fn fetch_products_page(
        &self,
        store_url: &str,
        limit: u32,
        page: u32,
    ) -> Result<Vec<Value>, ScraperError> {
        let url = Self::products_url(store_url, Some(limit), Some(page))?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let (_, body) = self.get_json(&url, store_url).await?;
                products_array(body, &url)
            }
        })
        .await
    }

    /// Issues a GET and decodes the body as JSON, mapping non-2xx statuses.
    async fn get_json(
        &self,
        url: &str,
        store_url: &str,
    ) -> Result<(StatusCode, Value), ScraperError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CONNECTION, "keep-alive");

        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.api_key, Some(&creds.api_password));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(ScraperError::RateLimited {
                domain: extract_domain(store_url),
                retry_after_secs,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        let value = serde_json::from_str::<Value>(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            tracing::debug!(%url, %preview, "response body is not JSON");
            ScraperError::Deserialize {
                context: format!("products page from {url}"),
                source: e,
            }
        })?;

        Ok((status, value))
    }

    /// Builds the `products.json` URL for the given store.
    ///
    /// Any path on `store_url` is discarded; the endpoint always lives at the
    /// store root. Query parameters are appended in `limit`, `page` order.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidShopUrl`] if no origin can be derived.
    pub fn products_url(
        store_url: &str,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<String, ScraperError> {
        let mut url = store_origin(store_url)?;
        url.set_path("/products.json");

        if limit.is_some() || page.is_some() {
            let mut pairs = url.query_pairs_mut();
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(page) = page {
                pairs.append_pair("page", &page.to_string());
            }
        }

        Ok(url.to_string())
    }
}

/// Pulls the `products` array out of a decoded response body.
fn products_array(body: Value, url: &str) -> Result<Vec<Value>, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidResponse {
        url: url.to_owned(),
        reason,
    };

    let mut map = match body {
        Value::Object(map) => map,
        other => {
            return Err(invalid(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )));
        }
    };

    match map.remove("products") {
        Some(Value::Array(products)) => Ok(products),
        Some(other) => Err(invalid(format!(
            "`products` is {}, expected an array",
            json_kind(&other)
        ))),
        None => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            Err(invalid(format!(
                "missing `products` key (keys: [{}])",
                keys.join(", ")
            )))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
