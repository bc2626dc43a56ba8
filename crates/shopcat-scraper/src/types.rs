//! Storefront types for the public `products.json` endpoint.
//!
//! Pages are decoded as raw JSON first and each product is decoded into
//! [`Product`] on its own, so one malformed product cannot fail its page.
//!
//! ## Observed shape
//!
//! - `tags` is a JSON array of strings. Older themes and some proxies return
//!   a single comma-separated string; both are accepted.
//! - `compare_at_price` is `null` when the variant is not on sale.
//! - `price` is a decimal string (`"30.00"`); a bare JSON number is accepted
//!   and rendered back to a string.
//! - `available` may be absent on older stores and is then treated as `false`.
//! - `images`, `variants`, and most string fields may be `null`.

use serde::{Deserialize, Deserializer, Serialize};

/// A single product from the storefront catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Numeric product ID (e.g., `6789012345678`). Stable across fetches.
    pub id: i64,

    #[serde(default)]
    pub title: Option<String>,

    /// URL slug for the product page (e.g., `"hi-boy-blood-orange-5mg"`).
    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default, deserialize_with = "tags_from_list_or_csv")]
    pub tags: Vec<String>,

    /// Raw HTML product description.
    #[serde(default)]
    pub body_html: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<ProductImage>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub variants: Vec<Variant>,
}

/// A single purchasable variant of a [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// Absent on some storefronts' default variants; the row is still kept.
    #[serde(default)]
    pub id: Option<i64>,

    /// Display title, e.g. `"12oz / 5mg THC"` or `"Default Title"`.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "decimal_string")]
    pub price: Option<String>,

    #[serde(default, deserialize_with = "decimal_string")]
    pub compare_at_price: Option<String>,

    #[serde(default)]
    pub available: Option<bool>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A product image. Only `src` is used downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}

impl Product {
    /// `src` of the first image, if the product has any images.
    #[must_use]
    pub fn first_image_src(&self) -> Option<&str> {
        self.images.first().and_then(|img| img.src.as_deref())
    }

    /// Every non-empty image `src` in gallery order, joined with `|`.
    #[must_use]
    pub fn joined_image_srcs(&self) -> String {
        self.images
            .iter()
            .filter_map(|img| img.src.as_deref())
            .filter(|src| !src.is_empty())
            .collect::<Vec<_>>()
            .join("|")
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    List(Vec<String>),
    Csv(String),
}

fn tags_from_list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<TagsRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(TagsRepr::List(tags)) => tags,
        Some(TagsRepr::Csv(raw)) => raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect(),
    };
    Ok(tags)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Text(String),
    Number(serde_json::Number),
}

fn decimal_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<DecimalRepr>::deserialize(deserializer)?.map(|repr| match repr {
            DecimalRepr::Text(s) => s,
            DecimalRepr::Number(n) => n.to_string(),
        }),
    )
}
