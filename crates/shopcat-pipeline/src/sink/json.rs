use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ExtractedBatch, ProductSink};
use crate::error::SinkError;

/// Writes the flat rows as a pretty-printed JSON array, replacing the file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl ProductSink for JsonFileSink {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn persist(&self, batch: &ExtractedBatch) -> Result<usize, SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_err(e))?;
        }

        let body = serde_json::to_vec_pretty(&batch.rows)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| self.io_err(e))?;

        tracing::info!(
            path = %self.path.display(),
            rows = batch.rows.len(),
            store_url = %batch.store_url,
            "wrote rows to JSON file"
        );
        Ok(batch.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcat_core::FlatRow;

    fn row(product_id: i64) -> FlatRow {
        FlatRow {
            store_domain: "drinkcann.com".to_string(),
            product_id,
            title: "Hi Boy".to_string(),
            handle: "hi-boy".to_string(),
            vendor: String::new(),
            product_type: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
            published_at: String::new(),
            tags: String::new(),
            body_html: String::new(),
            variant_id: None,
            variant_title: None,
            sku: None,
            price: None,
            compare_at_price: None,
            available: None,
            variant_created_at: None,
            variant_updated_at: None,
            image_src: None,
            all_image_srcs: String::new(),
        }
    }

    #[tokio::test]
    async fn writes_rows_and_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("shopify_products.json");
        let sink = JsonFileSink::new(&path);

        let first = ExtractedBatch {
            store_url: "https://drinkcann.com".to_string(),
            products: Vec::new(),
            rows: vec![row(1), row(2)],
        };
        assert_eq!(sink.persist(&first).await.unwrap(), 2);

        let second = ExtractedBatch {
            rows: vec![row(3)],
            ..first
        };
        assert_eq!(sink.persist(&second).await.unwrap(), 1);

        let saved: Vec<FlatRow> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].product_id, 3);
    }
}
