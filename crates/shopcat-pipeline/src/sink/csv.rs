use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use async_trait::async_trait;
use shopcat_core::{FlatRow, FLAT_ROW_COLUMNS};

use super::{ExtractedBatch, ProductSink};
use crate::error::SinkError;

type PathLock = Arc<tokio::sync::Mutex<()>>;

/// Append-only CSV writer.
///
/// The header is written only when the file is missing or empty, so repeated
/// runs against the same path accumulate rows under a single header.
/// Appenders in one process are serialized per path.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    headers: Vec<String>,
}

impl CsvSink {
    /// Sink with the standard [`FLAT_ROW_COLUMNS`] header.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_headers(path, FLAT_ROW_COLUMNS.iter().map(|c| (*c).to_string()).collect())
    }

    /// Sink with an explicit ordered header. Unknown columns render empty.
    #[must_use]
    pub fn with_headers(path: impl Into<PathBuf>, headers: Vec<String>) -> Self {
        Self {
            path: path.into(),
            headers,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProductSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn persist(&self, batch: &ExtractedBatch) -> Result<usize, SinkError> {
        if batch.rows.is_empty() {
            return Ok(0);
        }

        let lock = path_lock(&self.path);
        let _guard = lock.lock().await;

        let path = self.path.clone();
        let headers = self.headers.clone();
        let rows = batch.rows.clone();
        let written =
            tokio::task::spawn_blocking(move || append_rows(&path, &headers, &rows)).await??;

        tracing::info!(
            path = %self.path.display(),
            rows = written,
            store_url = %batch.store_url,
            "appended rows to CSV"
        );
        Ok(written)
    }
}

fn append_rows(path: &Path, headers: &[String], rows: &[FlatRow]) -> Result<usize, SinkError> {
    let io_err = |source: std::io::Error| SinkError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(io_err(e)),
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.write_record(row.to_record(headers))?;
    }
    writer.flush().map_err(io_err)?;

    Ok(rows.len())
}

/// Process-wide async lock for `path`.
fn path_lock(path: &Path) -> PathLock {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, PathLock>>> = OnceLock::new();

    let mut locks = LOCKS
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}
