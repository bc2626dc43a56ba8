//! Optional YAML scrape profile passed with `--config`.
//!
//! ```yaml
//! scraping:
//!   page_size: 100
//!   wait_time_ms: 2000
//!   max_products: 500
//! browser:
//!   user_agent: "Mozilla/5.0 ..."
//! ```
//!
//! Every key is optional; absent keys leave the environment-derived value alone.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AppConfig, ConfigError, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapeProfile {
    #[serde(default)]
    pub scraping: ScrapingSection,
    #[serde(default)]
    pub browser: BrowserSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapingSection {
    pub page_size: Option<u32>,
    /// Politeness delay between page requests.
    pub wait_time_ms: Option<u64>,
    pub max_products: Option<usize>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserSection {
    pub user_agent: Option<String>,
}

impl ScrapeProfile {
    /// Overlay the profile's values onto `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(page_size) = self.scraping.page_size {
            config.scraper_page_size = page_size;
        }
        if let Some(delay) = self.scraping.wait_time_ms {
            config.scraper_inter_request_delay_ms = delay;
        }
        if let Some(max_products) = self.scraping.max_products {
            config.scraper_max_products = Some(max_products);
        }
        if let Some(max_retries) = self.scraping.max_retries {
            config.scraper_max_retries = max_retries;
        }
        if let Some(user_agent) = &self.browser.user_agent {
            config.scraper_user_agent.clone_from(user_agent);
        }
    }
}

/// Load and validate a scrape profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_scrape_profile(path: &Path) -> Result<ScrapeProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile = parse_scrape_profile(&content)?;
    Ok(profile)
}

fn parse_scrape_profile(content: &str) -> Result<ScrapeProfile, ConfigError> {
    // An empty file is a valid, empty profile.
    if content.trim().is_empty() {
        return Ok(ScrapeProfile::default());
    }

    let profile: ScrapeProfile = serde_yaml::from_str(content)?;
    validate_profile(&profile)?;
    Ok(profile)
}

fn validate_profile(profile: &ScrapeProfile) -> Result<(), ConfigError> {
    if let Some(page_size) = profile.scraping.page_size {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Validation(format!(
                "scraping.page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }
    }

    if profile.scraping.max_products == Some(0) {
        return Err(ConfigError::Validation(
            "scraping.max_products must be greater than zero".to_string(),
        ));
    }

    if let Some(ua) = &profile.browser.user_agent {
        if ua.trim().is_empty() {
            return Err(ConfigError::Validation(
                "browser.user_agent must be non-empty".to_string(),
            ));
        }
    }

    Ok(())
}
