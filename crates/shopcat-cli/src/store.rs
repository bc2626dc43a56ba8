//! Read-only reports over the stored product documents.

use shopcat_core::AppConfig;
use shopcat_pipeline::{DocumentStore, PersistedProductRecord, PgDocumentStore};

/// Print stored products for one store.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the query fails.
pub(crate) async fn run_list(
    config: &AppConfig,
    store_url: &str,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let pool = shopcat_db::connect_pool_from_config(config).await?;
    let store = PgDocumentStore::new(pool);

    let store_url = shopcat_scraper::normalize_store_url(store_url);
    let records = store.list_for_store(&store_url, limit).await?;
    if records.is_empty() {
        println!("no products stored for {store_url}");
        return Ok(());
    }

    println!("{:<16} {:<48} {:<10} scraped at", "product id", "title", "variants");
    for record in &records {
        println!("{}", format_record_line(record));
    }
    println!("{} product(s)", records.len());
    Ok(())
}

/// Print totals, per-store counts, and one sample document.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a query fails.
pub(crate) async fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    let pool = shopcat_db::connect_pool_from_config(config).await?;

    let total = shopcat_db::count_product_documents(&pool).await?;
    let counts = shopcat_db::store_product_counts(&pool).await?;

    println!("total products: {total}");
    println!("distinct stores: {}", counts.len());
    for row in &counts {
        println!("  {:<56} {:>8}", row.store_url, row.products);
    }

    match shopcat_db::sample_product_document(&pool).await? {
        Some(sample) => {
            println!("sample document ({}):", sample.store_url);
            println!("{}", serde_json::to_string_pretty(&sample.document)?);
        }
        None => println!("no documents stored yet"),
    }
    Ok(())
}

fn format_record_line(record: &PersistedProductRecord) -> String {
    let title = record
        .document
        .get("title")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    let title: String = title.chars().take(48).collect();
    let variants = record
        .document
        .get("variants")
        .and_then(serde_json::Value::as_array)
        .map_or(0, Vec::len);
    format!(
        "{:<16} {:<48} {:<10} {}",
        record.product_id,
        title,
        variants,
        record.scraped_at.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_line_truncates_long_titles() {
        let scraped_at = "2026-01-02T03:04:05Z".parse().unwrap();
        let record = PersistedProductRecord::from_product(
            &serde_json::json!({
                "id": 42,
                "title": "x".repeat(80),
                "variants": [{ "id": 1 }, { "id": 2 }]
            }),
            "https://drinkcann.com",
            scraped_at,
        )
        .unwrap();

        let line = format_record_line(&record);
        assert!(line.starts_with("42 "));
        assert!(!line.contains(&"x".repeat(49)));
        assert!(line.contains(" 2 "));
        assert!(line.ends_with("2026-01-02 03:04:05"));
    }
}
