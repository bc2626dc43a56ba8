//! Offline unit tests for shopcat-db pool configuration and row types.
//! These tests do not require a live database connection.

use shopcat_core::{AppConfig, Environment};
use shopcat_db::{PoolConfig, ProductDocumentRow, StoreCountRow};
use std::path::PathBuf;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        log_level: "info".to_string(),
        output_dir: PathBuf::from("data"),
        credentials: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_page_size: 250,
        scraper_inter_request_delay_ms: 1500,
        scraper_max_retries: 0,
        scraper_retry_backoff_base_secs: 1,
        scraper_max_products: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_without_database_url_is_a_typed_error() {
    let mut config = app_config();
    config.database_url = None;

    let err = shopcat_db::connect_pool_from_config(&config)
        .await
        .unwrap_err();
    assert!(matches!(err, shopcat_db::DbError::MissingDatabaseUrl));
}

/// Compile-time smoke test: confirm that [`ProductDocumentRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn product_document_row_has_expected_fields() {
    use chrono::Utc;

    let row = ProductDocumentRow {
        id: 1_i64,
        product_id: 123_456_789_i64,
        store_url: "https://drinkcann.com".to_string(),
        handle: Some("hi-boy-blood-orange".to_string()),
        source_created_at: None,
        document: serde_json::json!({ "id": 123_456_789 }),
        scraped_at: Utc::now(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.product_id, 123_456_789);
    assert_eq!(row.store_url, "https://drinkcann.com");
    assert_eq!(row.document["id"], 123_456_789);
    assert!(row.source_created_at.is_none());
}

#[test]
fn store_count_row_compares_by_value() {
    let a = StoreCountRow {
        store_url: "https://drinkcann.com".to_string(),
        products: 3,
    };
    assert_eq!(a.clone(), a);
}
