use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use shopcat_db::{NewProductDocument, ProductDocumentRow};
use shopcat_scraper::ScraperError;
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::{ExtractedBatch, ProductSink};
use crate::error::SinkError;

/// A raw product enriched with capture metadata, keyed by `(product_id, store_url)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedProductRecord {
    pub product_id: i64,
    pub store_url: String,
    pub handle: Option<String>,
    pub source_created_at: Option<String>,
    /// The product JSON with `scraped_at` and `store_url` added.
    pub document: Value,
    pub scraped_at: DateTime<Utc>,
}

impl PersistedProductRecord {
    /// Builds a record from one raw product.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Record`] if the product is not an object or has
    /// no integer `id`.
    pub fn from_product(
        product: &Value,
        store_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<Self, ScraperError> {
        let record_err = |reason: &str| ScraperError::Record {
            product_id: product
                .get("id")
                .map_or_else(|| "unknown".to_owned(), ToString::to_string),
            reason: reason.to_owned(),
        };

        let Some(object) = product.as_object() else {
            return Err(record_err("product is not a JSON object"));
        };
        let product_id = object
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| record_err("missing or non-integer `id`"))?;

        let mut document = object.clone();
        document.insert(
            "scraped_at".to_owned(),
            Value::String(scraped_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        document.insert("store_url".to_owned(), Value::String(store_url.to_owned()));

        Ok(Self {
            product_id,
            store_url: store_url.to_owned(),
            handle: object.get("handle").and_then(Value::as_str).map(str::to_owned),
            source_created_at: object
                .get("created_at")
                .and_then(Value::as_str)
                .map(str::to_owned),
            document: Value::Object(document),
            scraped_at,
        })
    }
}

impl From<ProductDocumentRow> for PersistedProductRecord {
    fn from(row: ProductDocumentRow) -> Self {
        Self {
            product_id: row.product_id,
            store_url: row.store_url,
            handle: row.handle,
            source_created_at: row.source_created_at,
            document: row.document,
            scraped_at: row.scraped_at,
        }
    }
}

/// Keyed document storage for [`PersistedProductRecord`]s.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts or replaces the record for its `(product_id, store_url)`.
    /// Returns `true` when a new record was created.
    async fn upsert(&self, record: &PersistedProductRecord) -> Result<bool, SinkError>;

    async fn get(
        &self,
        product_id: i64,
        store_url: &str,
    ) -> Result<Option<PersistedProductRecord>, SinkError>;

    /// Records for one store; `limit = None` returns all of them.
    async fn list_for_store(
        &self,
        store_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PersistedProductRecord>, SinkError>;
}

#[async_trait]
impl<D: DocumentStore + ?Sized> DocumentStore for Arc<D> {
    async fn upsert(&self, record: &PersistedProductRecord) -> Result<bool, SinkError> {
        (**self).upsert(record).await
    }

    async fn get(
        &self,
        product_id: i64,
        store_url: &str,
    ) -> Result<Option<PersistedProductRecord>, SinkError> {
        (**self).get(product_id, store_url).await
    }

    async fn list_for_store(
        &self,
        store_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PersistedProductRecord>, SinkError> {
        (**self).list_for_store(store_url, limit).await
    }
}

/// Postgres-backed store over the `products` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn upsert(&self, record: &PersistedProductRecord) -> Result<bool, SinkError> {
        let outcome = shopcat_db::upsert_product_document(
            &self.pool,
            &NewProductDocument {
                product_id: record.product_id,
                store_url: &record.store_url,
                handle: record.handle.as_deref(),
                source_created_at: record.source_created_at.as_deref(),
                document: &record.document,
                scraped_at: record.scraped_at,
            },
        )
        .await?;
        Ok(outcome.inserted)
    }

    async fn get(
        &self,
        product_id: i64,
        store_url: &str,
    ) -> Result<Option<PersistedProductRecord>, SinkError> {
        let row = shopcat_db::get_product_document(&self.pool, product_id, store_url).await?;
        Ok(row.map(PersistedProductRecord::from))
    }

    async fn list_for_store(
        &self,
        store_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PersistedProductRecord>, SinkError> {
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let rows = shopcat_db::list_product_documents(&self.pool, store_url, limit).await?;
        Ok(rows.into_iter().map(PersistedProductRecord::from).collect())
    }
}

/// In-process store with the same keying rules as [`PgDocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    records: RwLock<HashMap<(i64, String), PersistedProductRecord>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upsert(&self, record: &PersistedProductRecord) -> Result<bool, SinkError> {
        let key = (record.product_id, record.store_url.clone());
        let previous = self.records.write().await.insert(key, record.clone());
        Ok(previous.is_none())
    }

    async fn get(
        &self,
        product_id: i64,
        store_url: &str,
    ) -> Result<Option<PersistedProductRecord>, SinkError> {
        let records = self.records.read().await;
        Ok(records.get(&(product_id, store_url.to_owned())).cloned())
    }

    async fn list_for_store(
        &self,
        store_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PersistedProductRecord>, SinkError> {
        let records = self.records.read().await;
        let mut matching: Vec<PersistedProductRecord> = records
            .values()
            .filter(|r| r.store_url == store_url)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.product_id);
        if let Some(limit) = limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }
}

/// Upserts every raw product of a batch into a [`DocumentStore`].
///
/// A product without an integer `id`, or one the store rejects, is logged and
/// skipped. Losing the store connection ([`SinkError::Unavailable`]) before
/// anything was written fails the call; after some progress it ends the batch
/// early and the products written so far are reported.
pub struct DocumentSink<D> {
    store: D,
}

impl<D: DocumentStore> DocumentSink<D> {
    #[must_use]
    pub fn new(store: D) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &D {
        &self.store
    }
}

#[async_trait]
impl<D: DocumentStore> ProductSink for DocumentSink<D> {
    fn name(&self) -> &'static str {
        "document"
    }

    async fn persist(&self, batch: &ExtractedBatch) -> Result<usize, SinkError> {
        let scraped_at = Utc::now();
        let mut written = 0usize;
        let mut inserted = 0usize;
        let mut skipped = 0usize;

        for product in &batch.products {
            let record =
                match PersistedProductRecord::from_product(product, &batch.store_url, scraped_at) {
                    Ok(record) => record,
                    Err(err) => {
                        skipped += 1;
                        tracing::warn!(store_url = %batch.store_url, error = %err, "skipping product");
                        continue;
                    }
                };

            match self.store.upsert(&record).await {
                Ok(created) => {
                    written += 1;
                    if created {
                        inserted += 1;
                    }
                }
                Err(err @ SinkError::Unavailable(_)) if written == 0 => return Err(err),
                Err(SinkError::Unavailable(reason)) => {
                    let remaining = batch.products.len() - written - skipped;
                    skipped += remaining;
                    tracing::warn!(
                        store_url = %batch.store_url,
                        written,
                        remaining,
                        reason = %reason,
                        "document store connection lost, ending batch early"
                    );
                    break;
                }
                Err(err) => {
                    skipped += 1;
                    tracing::warn!(
                        store_url = %batch.store_url,
                        product_id = record.product_id,
                        error = %err,
                        "failed to upsert product"
                    );
                }
            }
        }

        tracing::info!(
            store_url = %batch.store_url,
            written,
            inserted,
            updated = written - inserted,
            skipped,
            "upserted product documents"
        );
        Ok(written)
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
