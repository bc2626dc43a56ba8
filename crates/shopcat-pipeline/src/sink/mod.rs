//! Persistence sinks for scraped catalogs.
//!
//! - [`CsvSink`] appends flat rows under a fixed header.
//! - [`JsonFileSink`] replaces a file with the flat rows as a JSON array.
//! - [`DocumentSink`] upserts raw products into a [`DocumentStore`].

mod csv;
mod document;
mod json;

pub use self::csv::CsvSink;
pub use self::document::{
    DocumentSink, DocumentStore, MemoryDocumentStore, PersistedProductRecord, PgDocumentStore,
};
pub use self::json::JsonFileSink;

use async_trait::async_trait;
use serde_json::Value;
use shopcat_core::FlatRow;

use crate::error::SinkError;

/// Everything one scrape produced for one store.
#[derive(Debug, Clone)]
pub struct ExtractedBatch {
    pub store_url: String,
    /// Raw product objects, in fetch order.
    pub products: Vec<Value>,
    pub rows: Vec<FlatRow>,
}

/// A destination for scraped products.
#[async_trait]
pub trait ProductSink: Send + Sync {
    /// Short name used in logs and CLI output.
    fn name(&self) -> &'static str;

    /// Writes the batch and returns the number of items written.
    ///
    /// Tabular sinks count rows; the document sink counts products.
    async fn persist(&self, batch: &ExtractedBatch) -> Result<usize, SinkError>;
}
