use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::*;

const STORE: &str = "https://drinkcann.com";

fn batch(products: Vec<Value>) -> ExtractedBatch {
    ExtractedBatch {
        store_url: STORE.to_string(),
        products,
        rows: Vec::new(),
    }
}

/// Store that fails every upsert after the first `ok_writes`.
struct FlakyStore {
    inner: MemoryDocumentStore,
    ok_writes: usize,
    calls: AtomicUsize,
}

impl FlakyStore {
    fn new(ok_writes: usize) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            ok_writes,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn upsert(&self, record: &PersistedProductRecord) -> Result<bool, SinkError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.ok_writes {
            return Err(SinkError::Unavailable("connection reset".to_string()));
        }
        self.inner.upsert(record).await
    }

    async fn get(
        &self,
        product_id: i64,
        store_url: &str,
    ) -> Result<Option<PersistedProductRecord>, SinkError> {
        self.inner.get(product_id, store_url).await
    }

    async fn list_for_store(
        &self,
        store_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PersistedProductRecord>, SinkError> {
        self.inner.list_for_store(store_url, limit).await
    }
}

/// Store whose backend rejects one product id, like Postgres rejecting a
/// `\u0000` inside a JSONB document.
struct RejectsProduct {
    inner: MemoryDocumentStore,
    rejected_id: i64,
}

#[async_trait]
impl DocumentStore for RejectsProduct {
    async fn upsert(&self, record: &PersistedProductRecord) -> Result<bool, SinkError> {
        if record.product_id == self.rejected_id {
            return Err(SinkError::from(shopcat_db::DbError::Sqlx(sqlx::Error::Protocol(
                "unsupported Unicode escape sequence".to_string(),
            ))));
        }
        self.inner.upsert(record).await
    }

    async fn get(
        &self,
        product_id: i64,
        store_url: &str,
    ) -> Result<Option<PersistedProductRecord>, SinkError> {
        self.inner.get(product_id, store_url).await
    }

    async fn list_for_store(
        &self,
        store_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PersistedProductRecord>, SinkError> {
        self.inner.list_for_store(store_url, limit).await
    }
}

#[test]
fn record_carries_capture_metadata() {
    let scraped_at = Utc::now();
    let record = PersistedProductRecord::from_product(
        &json!({ "id": 7, "handle": "hi-boy", "created_at": "2024-01-01T00:00:00-05:00" }),
        STORE,
        scraped_at,
    )
    .unwrap();

    assert_eq!(record.product_id, 7);
    assert_eq!(record.handle.as_deref(), Some("hi-boy"));
    assert_eq!(record.document["store_url"], STORE);
    assert!(record.document["scraped_at"].is_string());
    assert_eq!(record.document["id"], 7);
}

#[test]
fn record_without_id_is_rejected() {
    let err = PersistedProductRecord::from_product(&json!({ "title": "x" }), STORE, Utc::now())
        .unwrap_err();
    assert!(matches!(err, ScraperError::Record { .. }));
}

#[tokio::test]
async fn upserting_twice_keeps_one_record_with_latest_values() {
    let sink = DocumentSink::new(MemoryDocumentStore::new());

    sink.persist(&batch(vec![json!({ "id": 1, "title": "first" })]))
        .await
        .unwrap();
    sink.persist(&batch(vec![json!({ "id": 1, "title": "second" })]))
        .await
        .unwrap();

    assert_eq!(sink.store().len().await, 1);
    let stored = sink.store().get(1, STORE).await.unwrap().unwrap();
    assert_eq!(stored.document["title"], "second");
}

#[tokio::test]
async fn same_id_in_different_stores_is_kept_apart() {
    let store = MemoryDocumentStore::new();
    let now = Utc::now();
    for url in [STORE, "https://shop.example.com"] {
        let record = PersistedProductRecord::from_product(&json!({ "id": 1 }), url, now).unwrap();
        assert!(store.upsert(&record).await.unwrap());
    }
    assert_eq!(store.len().await, 2);
    assert_eq!(store.list_for_store(STORE, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn products_without_id_are_skipped() {
    let sink = DocumentSink::new(MemoryDocumentStore::new());
    let products = vec![json!({ "id": 1 }), json!({ "title": "no id" }), json!({ "id": 3 })];

    let written = sink.persist(&batch(products)).await.unwrap();

    assert_eq!(written, 2);
    let listed = sink.store().list_for_store(STORE, None).await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn list_for_store_honors_limit() {
    let sink = DocumentSink::new(MemoryDocumentStore::new());
    let products = (1..=5).map(|id| json!({ "id": id })).collect();
    sink.persist(&batch(products)).await.unwrap();

    let listed = sink.store().list_for_store(STORE, Some(2)).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn store_failure_before_first_write_is_a_sink_error() {
    let sink = DocumentSink::new(FlakyStore::new(0));

    let err = sink
        .persist(&batch(vec![json!({ "id": 1 }), json!({ "id": 2 })]))
        .await
        .unwrap_err();

    assert!(matches!(err, SinkError::Unavailable(_)));
}

#[tokio::test]
async fn connection_loss_after_progress_ends_the_batch() {
    let sink = DocumentSink::new(FlakyStore::new(1));

    let written = sink
        .persist(&batch(vec![json!({ "id": 1 }), json!({ "id": 2 }), json!({ "id": 3 })]))
        .await
        .unwrap();

    assert_eq!(written, 1);
    assert!(sink.store().get(1, STORE).await.unwrap().is_some());
    assert!(sink.store().get(2, STORE).await.unwrap().is_none());
    assert_eq!(sink.store().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rejected_first_record_does_not_abort_the_batch() {
    let sink = DocumentSink::new(RejectsProduct {
        inner: MemoryDocumentStore::new(),
        rejected_id: 1,
    });

    let written = sink
        .persist(&batch(vec![json!({ "id": 1 }), json!({ "id": 2 }), json!({ "id": 3 })]))
        .await
        .unwrap();

    assert_eq!(written, 2);
    let ids: Vec<i64> = sink
        .store()
        .list_for_store(STORE, None)
        .await
        .unwrap()
        .iter()
        .map(|r| r.product_id)
        .collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn rejected_records_everywhere_write_nothing_but_succeed() {
    let sink = DocumentSink::new(RejectsProduct {
        inner: MemoryDocumentStore::new(),
        rejected_id: 1,
    });

    let written = sink.persist(&batch(vec![json!({ "id": 1 })])).await.unwrap();

    assert_eq!(written, 0);
    assert!(sink.store().inner.is_empty().await);
}
