use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment, ShopifyCredentials};
use crate::{ConfigError, MAX_PAGE_SIZE};

/// Desktop Chrome user agent; some storefronts reject obvious bot agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid, or if
/// `DATABASE_URL` is unset in production.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid, or if
/// `DATABASE_URL` is unset in production.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|s| !s.is_empty());
    let env = parse_environment(&or_default("SHOPCAT_ENV", "development"))?;
    if env == Environment::Production && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }
    let log_level = or_default("SHOPCAT_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("SHOPCAT_OUTPUT_DIR", "data"));

    let credentials = match (lookup("SHOPIFY_API_KEY"), lookup("SHOPIFY_API_PASSWORD")) {
        (Ok(api_key), Ok(api_password)) if !api_key.is_empty() && !api_password.is_empty() => {
            Some(ShopifyCredentials {
                api_key,
                api_password,
            })
        }
        _ => None,
    };

    let db_max_connections = parse_u32("SHOPCAT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SHOPCAT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHOPCAT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("SHOPCAT_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("SHOPCAT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_page_size = parse_u32("SHOPCAT_SCRAPER_PAGE_SIZE", "250")?;
    if scraper_page_size == 0 || scraper_page_size > MAX_PAGE_SIZE {
        return Err(invalid(
            "SHOPCAT_SCRAPER_PAGE_SIZE",
            format!("must be between 1 and {MAX_PAGE_SIZE}, got {scraper_page_size}"),
        ));
    }
    let scraper_inter_request_delay_ms =
        parse_u64("SHOPCAT_SCRAPER_INTER_REQUEST_DELAY_MS", "1500")?;
    let scraper_max_retries = parse_u32("SHOPCAT_SCRAPER_MAX_RETRIES", "0")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("SHOPCAT_SCRAPER_RETRY_BACKOFF_BASE_SECS", "1")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        output_dir,
        credentials,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_page_size,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_max_products: None,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPCAT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
