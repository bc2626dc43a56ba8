pub mod agent;
pub mod client;
pub mod error;
pub mod flatten;
pub mod metrics;
mod rate_limit;
pub mod stop;
pub mod types;

pub use agent::{ApiAgent, CatalogAgent};
pub use client::{
    extract_domain, normalize_store_url, store_origin, CatalogClient, FetchOptions, FetchOutcome,
    MAX_PAGES,
};
pub use error::ScraperError;
pub use flatten::{flatten, flatten_product};
pub use metrics::{CatalogMetrics, RowMetrics};
pub use stop::StopHandle;
pub use types::{Product, ProductImage, Variant};
