//! Page-numbered fetch loop for `CatalogClient`.

use std::time::Duration;

use serde_json::Value;
use shopcat_core::AppConfig;

use crate::error::ScraperError;
use crate::stop::StopHandle;

use super::CatalogClient;
use super::MAX_PAGES;

/// Knobs for one fetch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// `limit` query parameter; a page shorter than this ends pagination.
    pub page_size: u32,
    /// Politeness delay applied before every page except the first.
    pub inter_request_delay_ms: u64,
    /// Stop once this many products are accumulated.
    pub max_products: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: shopcat_core::MAX_PAGE_SIZE,
            inter_request_delay_ms: 1500,
            max_products: None,
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.scraper_page_size,
            inter_request_delay_ms: config.scraper_inter_request_delay_ms,
            max_products: config.scraper_max_products,
        }
    }
}

/// Result of a fetch session.
///
/// A session is best-effort: whatever was accumulated before a failure is
/// kept in `products`, and the failure itself is reported in `error`.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Raw product objects in page order.
    pub products: Vec<Value>,
    /// Number of page requests issued.
    pub requests: usize,
    /// `true` when a [`StopHandle`] ended the session.
    pub stopped_early: bool,
    /// The error that ended the session, if any.
    pub error: Option<ScraperError>,
}

impl FetchOutcome {
    /// `true` when pagination ran to its natural end (or the product cap).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && !self.stopped_early
    }

    /// Collapses the outcome into a `Result`, discarding partial products on error.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session.
    pub fn into_result(self) -> Result<Vec<Value>, ScraperError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.products),
        }
    }
}

impl CatalogClient {
    /// Walks `products.json?limit={page_size}&page={n}` from page 1 until the
    /// catalog is exhausted.
    ///
    /// Pagination ends on the first page that is empty or shorter than
    /// `page_size`. A page of exactly `page_size` items is followed by one more
    /// request. The stop handle is checked before each request, never during one.
    ///
    /// Errors never discard what was already fetched; see [`FetchOutcome`].
    /// Exceeding [`MAX_PAGES`] ends the session with
    /// [`ScraperError::PaginationLimit`].
    pub async fn fetch_all(
        &self,
        store_url: &str,
        options: &FetchOptions,
        stop: &StopHandle,
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let page_size = options.page_size.max(1);
        let mut page: u32 = 1;

        loop {
            if outcome.requests > 0 && options.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(options.inter_request_delay_ms)).await;
            }

            if stop.is_stopped() {
                tracing::info!(store_url, page, "stop requested, ending fetch session");
                outcome.stopped_early = true;
                break;
            }

            if outcome.requests >= MAX_PAGES {
                outcome.error = Some(ScraperError::PaginationLimit {
                    shop_url: store_url.to_owned(),
                    max_pages: MAX_PAGES,
                });
                break;
            }

            outcome.requests += 1;
            let batch = match self.fetch_products_page(store_url, page_size, page).await {
                Ok(batch) => batch,
                Err(err) => {
                    tracing::warn!(
                        store_url,
                        page,
                        accumulated = outcome.products.len(),
                        error = %err,
                        "page fetch failed, keeping partial results"
                    );
                    outcome.error = Some(err);
                    break;
                }
            };

            let count = batch.len();
            tracing::debug!(store_url, page, count, "fetched products page");

            if count == 0 {
                break;
            }
            outcome.products.extend(batch);

            if let Some(cap) = options.max_products {
                if outcome.products.len() >= cap {
                    outcome.products.truncate(cap);
                    tracing::info!(store_url, cap, "product cap reached");
                    break;
                }
            }

            if count < page_size as usize {
                break;
            }
            page += 1;
        }

        tracing::info!(
            store_url,
            products = outcome.products.len(),
            requests = outcome.requests,
            complete = outcome.is_complete(),
            "fetch session finished"
        );
        outcome
    }
}
