//! Scrape pipeline orchestration.

use std::fmt;

use serde::Serialize;
use shopcat_scraper::{CatalogAgent, CatalogMetrics};

use crate::error::PipelineError;
use crate::sink::{ExtractedBatch, ProductSink};

/// Where a [`Pipeline`] is in its run.
///
/// `Idle → Connected → Fetching → Flattening → Persisting → Done`, with a
/// jump to `Failed` from `Idle`, `Fetching`, or `Persisting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Connected,
    Fetching,
    Flattening,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Connected => "connected",
            Self::Fetching => "fetching",
            Self::Flattening => "flattening",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub store_url: String,
    pub products_fetched: usize,
    pub rows: usize,
    /// Items written by the sink (rows or documents, depending on the sink).
    pub written: usize,
    pub requests: usize,
    /// `false` when the fetch ended early but still returned products.
    pub complete: bool,
    pub metrics: CatalogMetrics,
}

/// Runs one agent into one sink.
pub struct Pipeline<A, S> {
    agent: A,
    sink: S,
    state: PipelineState,
}

impl<A: CatalogAgent, S: ProductSink> Pipeline<A, S> {
    pub fn new(agent: A, sink: S) -> Self {
        Self {
            agent,
            sink,
            state: PipelineState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Connects, fetches every page, flattens, and persists.
    ///
    /// An empty catalog finishes `Done` without touching the sink. A fetch
    /// that fails after retrieving some products still persists them, and
    /// the summary reports `complete = false`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Connectivity`] when the pre-flight probe fails.
    /// - [`PipelineError::Fetch`] when the fetch fails before any product arrives.
    /// - [`PipelineError::Sink`] when the sink cannot write.
    pub async fn run(&mut self) -> Result<PipelineSummary, PipelineError> {
        let store_url = self.agent.store_url().to_owned();

        if let Err(err) = self.agent.connect().await {
            self.transition(PipelineState::Failed);
            return Err(PipelineError::Connectivity(err));
        }
        self.transition(PipelineState::Connected);

        self.transition(PipelineState::Fetching);
        let outcome = self.agent.crawl().await;
        let complete = outcome.is_complete();
        let requests = outcome.requests;

        if let Some(err) = outcome.error {
            if outcome.products.is_empty() {
                self.transition(PipelineState::Failed);
                return Err(PipelineError::Fetch(err));
            }
            tracing::warn!(
                store_url = %store_url,
                products = outcome.products.len(),
                error = %err,
                "fetch ended early, continuing with partial catalog"
            );
        }
        let products = outcome.products;
        let products_fetched = products.len();

        self.transition(PipelineState::Flattening);
        let rows = self.agent.extract_data(&products);
        let metrics = CatalogMetrics::from_rows(&rows);

        let written = if products.is_empty() {
            tracing::info!(store_url = %store_url, "catalog is empty, nothing to persist");
            0
        } else {
            self.transition(PipelineState::Persisting);
            let batch = ExtractedBatch {
                store_url: store_url.clone(),
                products,
                rows,
            };
            match self.sink.persist(&batch).await {
                Ok(written) => written,
                Err(err) => {
                    self.transition(PipelineState::Failed);
                    return Err(PipelineError::Sink(err));
                }
            }
        };

        self.transition(PipelineState::Done);
        let summary = PipelineSummary {
            store_url,
            products_fetched,
            rows: metrics.rows,
            written,
            requests,
            complete,
            metrics,
        };
        tracing::info!(
            store_url = %summary.store_url,
            sink = self.sink.name(),
            products = summary.products_fetched,
            rows = summary.rows,
            written = summary.written,
            "pipeline finished"
        );
        Ok(summary)
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "pipeline state change");
        self.state = next;
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
