use serde::{Deserialize, Serialize};

/// Column order of the tabular sink. Matches the field order of [`FlatRow`].
pub const FLAT_ROW_COLUMNS: [&str; 21] = [
    "store_domain",
    "product_id",
    "title",
    "handle",
    "vendor",
    "product_type",
    "created_at",
    "updated_at",
    "published_at",
    "tags",
    "body_html",
    "variant_id",
    "variant_title",
    "sku",
    "price",
    "compare_at_price",
    "available",
    "variant_created_at",
    "variant_updated_at",
    "image_src",
    "all_image_srcs",
];

/// One product/variant pair projected into a single flat record.
///
/// Product-level fields are duplicated across every row of the same product.
/// Variant-level fields are `None` on the placeholder row emitted for a
/// product without variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    /// Storefront host, e.g. `"drinkcann.com"`.
    pub store_domain: String,
    pub product_id: i64,
    pub title: String,
    pub handle: String,
    pub vendor: String,
    pub product_type: String,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: String,
    /// Tags joined with `", "`.
    pub tags: String,
    pub body_html: String,
    pub variant_id: Option<i64>,
    pub variant_title: Option<String>,
    pub sku: Option<String>,
    /// Decimal string exactly as the storefront returns it, e.g. `"12.99"`.
    pub price: Option<String>,
    pub compare_at_price: Option<String>,
    pub available: Option<bool>,
    pub variant_created_at: Option<String>,
    pub variant_updated_at: Option<String>,
    /// `src` of the first product image.
    pub image_src: Option<String>,
    /// Every non-empty image `src`, joined with `|`.
    pub all_image_srcs: String,
}

impl FlatRow {
    /// Returns `true` for the placeholder row of a product without variants.
    ///
    /// Variant rows always carry `available`; `variant_id` may be absent on
    /// either kind of row.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.available.is_none()
    }

    /// Renders one column as text for tabular output.
    ///
    /// Absent values render as an empty string. Returns `None` for a column
    /// name that is not part of [`FLAT_ROW_COLUMNS`].
    #[must_use]
    pub fn column_value(&self, column: &str) -> Option<String> {
        let value = match column {
            "store_domain" => self.store_domain.clone(),
            "product_id" => self.product_id.to_string(),
            "title" => self.title.clone(),
            "handle" => self.handle.clone(),
            "vendor" => self.vendor.clone(),
            "product_type" => self.product_type.clone(),
            "created_at" => self.created_at.clone(),
            "updated_at" => self.updated_at.clone(),
            "published_at" => self.published_at.clone(),
            "tags" => self.tags.clone(),
            "body_html" => self.body_html.clone(),
            "variant_id" => self.variant_id.map(|id| id.to_string()).unwrap_or_default(),
            "variant_title" => self.variant_title.clone().unwrap_or_default(),
            "sku" => self.sku.clone().unwrap_or_default(),
            "price" => self.price.clone().unwrap_or_default(),
            "compare_at_price" => self.compare_at_price.clone().unwrap_or_default(),
            "available" => self.available.map(|a| a.to_string()).unwrap_or_default(),
            "variant_created_at" => self.variant_created_at.clone().unwrap_or_default(),
            "variant_updated_at" => self.variant_updated_at.clone().unwrap_or_default(),
            "image_src" => self.image_src.clone().unwrap_or_default(),
            "all_image_srcs" => self.all_image_srcs.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Renders the row in the order given by `columns`; unknown columns are empty.
    #[must_use]
    pub fn to_record<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.column_value(c.as_ref()).unwrap_or_default())
            .collect()
    }
}
