pub mod app_config;
pub mod config;
pub mod profile;
pub mod rows;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ShopifyCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use profile::{load_scrape_profile, ScrapeProfile};
pub use rows::{FlatRow, FLAT_ROW_COLUMNS};

/// Largest page size the storefront `products.json` endpoint honors.
pub const MAX_PAGE_SIZE: u32 = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read scrape profile {path}: {source}")]
    ProfileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scrape profile: {0}")]
    ProfileParse(#[from] serde_yaml::Error),

    #[error("invalid scrape profile: {0}")]
    Validation(String),
}
