//! Store URL normalization and domain extraction.

use reqwest::Url;

use crate::error::ScraperError;

/// Reduces a store URL to its scheme+host origin.
///
/// `"https://drinkcann.com/collections/all"` becomes `https://drinkcann.com`.
/// A bare host such as `"drinkcann.com"` is assumed to be served over HTTPS.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidShopUrl`] if the input has no usable host.
pub fn store_origin(store_url: &str) -> Result<Url, ScraperError> {
    let trimmed = store_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ScraperError::InvalidShopUrl {
            shop_url: store_url.to_owned(),
            reason: "URL is empty".to_owned(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| ScraperError::InvalidShopUrl {
        shop_url: store_url.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScraperError::InvalidShopUrl {
            shop_url: store_url.to_owned(),
            reason: "expected an http(s) URL with a host".to_owned(),
        });
    }

    Url::parse(&url.origin().ascii_serialization()).map_err(|e| ScraperError::InvalidShopUrl {
        shop_url: store_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Canonical form of a store URL as given by the caller: surrounding
/// whitespace and trailing slashes removed.
///
/// This is the `store_url` half of the persistence key, so
/// `https://drinkcann.com/` and `https://drinkcann.com` name the same store.
#[must_use]
pub fn normalize_store_url(store_url: &str) -> String {
    store_url.trim().trim_end_matches('/').to_owned()
}

/// Extracts the host (plus non-default port) from a store URL.
///
/// Used as `store_domain` on flattened rows and in error messages. Falls back
/// to the input string if it cannot be parsed.
#[must_use]
pub fn extract_domain(store_url: &str) -> String {
    store_origin(store_url)
        .ok()
        .and_then(|u| {
            u.host_str().map(|host| match u.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            })
        })
        .unwrap_or_else(|| store_url.to_owned())
}
