//! Projects nested storefront products into [`FlatRow`]s.
//!
//! One row per variant, in the storefront's variant order. A product with no
//! variants still yields a single placeholder row so it is never silently
//! dropped from tabular output.

use serde_json::Value;
use shopcat_core::FlatRow;

use crate::error::ScraperError;
use crate::types::{Product, Variant};

/// Flattens a batch of raw products for `store_domain`.
///
/// A product that cannot be decoded (for example, one without an `id`) is
/// logged and skipped; the rest of the batch is still flattened.
#[must_use]
pub fn flatten(products: &[Value], store_domain: &str) -> Vec<FlatRow> {
    let mut rows = Vec::with_capacity(products.len());
    let mut skipped = 0usize;

    for raw in products {
        match flatten_product(raw, store_domain) {
            Ok(product_rows) => rows.extend(product_rows),
            Err(err) => {
                skipped += 1;
                tracing::warn!(store_domain, error = %err, "skipping product");
            }
        }
    }

    tracing::debug!(
        store_domain,
        products = products.len(),
        rows = rows.len(),
        skipped,
        "flattened products"
    );
    rows
}

/// Flattens a single raw product.
///
/// # Errors
///
/// Returns [`ScraperError::Record`] when `raw` does not decode as a product.
/// The error carries the product's `id` when one is present, else `"unknown"`.
pub fn flatten_product(raw: &Value, store_domain: &str) -> Result<Vec<FlatRow>, ScraperError> {
    let product: Product =
        serde_json::from_value(raw.clone()).map_err(|e| ScraperError::Record {
            product_id: raw_product_id(raw),
            reason: e.to_string(),
        })?;

    Ok(product_rows(&product, store_domain))
}

fn product_rows(product: &Product, store_domain: &str) -> Vec<FlatRow> {
    let base = FlatRow {
        store_domain: store_domain.to_owned(),
        product_id: product.id,
        title: product.title.clone().unwrap_or_default(),
        handle: product.handle.clone().unwrap_or_default(),
        vendor: product.vendor.clone().unwrap_or_default(),
        product_type: product.product_type.clone().unwrap_or_default(),
        created_at: product.created_at.clone().unwrap_or_default(),
        updated_at: product.updated_at.clone().unwrap_or_default(),
        published_at: product.published_at.clone().unwrap_or_default(),
        tags: product.tags.join(", "),
        body_html: product.body_html.clone().unwrap_or_default(),
        variant_id: None,
        variant_title: None,
        sku: None,
        price: None,
        compare_at_price: None,
        available: None,
        variant_created_at: None,
        variant_updated_at: None,
        image_src: product.first_image_src().map(str::to_owned),
        all_image_srcs: product.joined_image_srcs(),
    };

    if product.variants.is_empty() {
        return vec![base];
    }

    product
        .variants
        .iter()
        .map(|variant| with_variant(base.clone(), variant))
        .collect()
}

fn with_variant(mut row: FlatRow, variant: &Variant) -> FlatRow {
    row.variant_id = variant.id;
    row.variant_title.clone_from(&variant.title);
    row.sku.clone_from(&variant.sku);
    row.price.clone_from(&variant.price);
    row.compare_at_price.clone_from(&variant.compare_at_price);
    // Older storefronts omit `available`; treat that as out of stock.
    row.available = Some(variant.available.unwrap_or(false));
    row.variant_created_at.clone_from(&variant.created_at);
    row.variant_updated_at.clone_from(&variant.updated_at);
    row
}

/// Best-effort id for error messages, accepting numeric or string ids.
fn raw_product_id(raw: &Value) -> String {
    match raw.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "unknown".to_owned(),
    }
}

#[cfg(test)]
#[path = "flatten_test.rs"]
mod tests;
