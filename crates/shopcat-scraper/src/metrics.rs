//! Derived per-row and per-catalog metrics for scrape summaries.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use shopcat_core::FlatRow;

/// Metrics derived from a single [`FlatRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowMetrics {
    /// Variant price; `None` when absent or not a valid decimal.
    pub price: Option<Decimal>,
    pub available: bool,
    pub image_count: usize,
    pub tag_count: usize,
    /// Length of `body_html` in characters.
    pub description_length: usize,
}

impl RowMetrics {
    #[must_use]
    pub fn from_row(row: &FlatRow) -> Self {
        Self {
            price: row
                .price
                .as_deref()
                .and_then(|p| Decimal::from_str(p.trim()).ok()),
            available: row.available.unwrap_or(false),
            image_count: count_parts(&row.all_image_srcs, '|'),
            tag_count: count_parts(&row.tags, ','),
            description_length: row.body_html.chars().count(),
        }
    }
}

/// Aggregate metrics over every row of a scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogMetrics {
    pub rows: usize,
    pub products: usize,
    pub available_rows: usize,
    pub priced_rows: usize,
    /// Mean price across priced rows, rounded to cents.
    pub average_price: Option<Decimal>,
}

impl CatalogMetrics {
    #[must_use]
    pub fn from_rows(rows: &[FlatRow]) -> Self {
        let mut products = HashSet::new();
        let mut available_rows = 0usize;
        let mut priced_rows = 0usize;
        let mut price_total = Decimal::ZERO;

        for row in rows {
            products.insert(row.product_id);
            let metrics = RowMetrics::from_row(row);
            if metrics.available {
                available_rows += 1;
            }
            if let Some(price) = metrics.price {
                priced_rows += 1;
                price_total += price;
            }
        }

        let average_price = (priced_rows > 0)
            .then(|| (price_total / Decimal::from(priced_rows)).round_dp(2));

        Self {
            rows: rows.len(),
            products: products.len(),
            available_rows,
            priced_rows,
            average_price,
        }
    }
}

fn count_parts(joined: &str, separator: char) -> usize {
    joined
        .split(separator)
        .filter(|part| !part.trim().is_empty())
        .count()
}
