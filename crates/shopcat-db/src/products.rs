//! Database operations for the `products` document table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductDocumentRow {
    pub id: i64,
    /// Storefront product id.
    pub product_id: i64,
    pub store_url: String,
    pub handle: Option<String>,
    /// Storefront `created_at`, verbatim.
    pub source_created_at: Option<String>,
    /// Raw product JSON plus `scraped_at` and `store_url`.
    pub document: Value,
    pub scraped_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-store product count, as reported by `shopcat check`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoreCountRow {
    pub store_url: String,
    pub products: i64,
}

/// Input for [`upsert_product_document`].
#[derive(Debug, Clone, Copy)]
pub struct NewProductDocument<'a> {
    pub product_id: i64,
    pub store_url: &'a str,
    pub handle: Option<&'a str>,
    pub source_created_at: Option<&'a str>,
    pub document: &'a Value,
    pub scraped_at: DateTime<Utc>,
}

/// Result of an upsert: the row id and whether a new row was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: i64,
    pub inserted: bool,
}

const SELECT_COLUMNS: &str = "id, product_id, store_url, handle, source_created_at, document, \
                              scraped_at, created_at, updated_at";

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Upserts a product document.
///
/// Conflicts on `(product_id, store_url)` replace `handle`,
/// `source_created_at`, `document`, and `scraped_at` in place and bump
/// `updated_at`. Re-running a scrape therefore never duplicates a product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product_document(
    pool: &PgPool,
    product: &NewProductDocument<'_>,
) -> Result<UpsertOutcome, DbError> {
    // `xmax = 0` only holds for a freshly inserted tuple.
    let (id, inserted): (i64, bool) = sqlx::query_as(
        "INSERT INTO products \
             (product_id, store_url, handle, source_created_at, document, scraped_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (product_id, store_url) DO UPDATE SET \
             handle            = EXCLUDED.handle, \
             source_created_at = EXCLUDED.source_created_at, \
             document          = EXCLUDED.document, \
             scraped_at        = EXCLUDED.scraped_at, \
             updated_at        = NOW() \
         RETURNING id, (xmax = 0) AS inserted",
    )
    .bind(product.product_id)
    .bind(product.store_url)
    .bind(product.handle)
    .bind(product.source_created_at)
    .bind(product.document)
    .bind(product.scraped_at)
    .fetch_one(pool)
    .await?;

    Ok(UpsertOutcome { id, inserted })
}

/// Fetches one stored document by its natural key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_document(
    pool: &PgPool,
    product_id: i64,
    store_url: &str,
) -> Result<Option<ProductDocumentRow>, DbError> {
    let row = sqlx::query_as::<_, ProductDocumentRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products WHERE product_id = $1 AND store_url = $2"
    ))
    .bind(product_id)
    .bind(store_url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists stored documents for one store, newest storefront products first.
///
/// `limit = None` returns every row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_documents(
    pool: &PgPool,
    store_url: &str,
    limit: Option<i64>,
) -> Result<Vec<ProductDocumentRow>, DbError> {
    // `LIMIT NULL` is `LIMIT ALL` in Postgres.
    let rows = sqlx::query_as::<_, ProductDocumentRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products WHERE store_url = $1 \
         ORDER BY source_created_at DESC NULLS LAST, product_id \
         LIMIT $2"
    ))
    .bind(store_url)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total number of stored product documents.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_product_documents(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Product counts grouped by store, largest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn store_product_counts(pool: &PgPool) -> Result<Vec<StoreCountRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreCountRow>(
        "SELECT store_url, COUNT(*) AS products FROM products \
         GROUP BY store_url \
         ORDER BY products DESC, store_url",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// The most recently scraped document, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sample_product_document(pool: &PgPool) -> Result<Option<ProductDocumentRow>, DbError> {
    let row = sqlx::query_as::<_, ProductDocumentRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products ORDER BY scraped_at DESC, id DESC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
