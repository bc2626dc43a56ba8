//! Scrape pipeline for storefront catalogs.
//!
//! Drives a [`CatalogAgent`](shopcat_scraper::CatalogAgent) through
//! connect, fetch, and flatten, then hands the batch to one [`ProductSink`]:
//! an append-only CSV file, a JSON file, or the keyed document store.

pub mod driver;
pub mod error;
pub mod sink;

pub use driver::{Pipeline, PipelineState, PipelineSummary};
pub use error::{PipelineError, SinkError};
pub use sink::{
    CsvSink, DocumentSink, DocumentStore, ExtractedBatch, JsonFileSink, MemoryDocumentStore,
    PersistedProductRecord, PgDocumentStore, ProductSink,
};
