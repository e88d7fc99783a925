//! Validation of raw items submitted for import.
//!
//! Import requests carry loosely-typed JSON. Each item is partitioned into
//! either a [`ProductImport`] ready for a store or a [`SkippedProduct`] with
//! the reason it was rejected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::products::{AiOptimization, Price, Product, ProductStatus, DEFAULT_CURRENCY};

/// Why an import item was not handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The item has no `id` field (or it is `null`).
    MissingId,
    /// The item has an id but its fields are malformed.
    Invalid(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingId => f.write_str("Missing ID"),
            SkipReason::Invalid(detail) => write!(f, "Invalid product: {detail}"),
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedProduct {
    /// The item exactly as submitted.
    pub product: Value,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    /// A new catalog row was created.
    Imported,
    /// An existing row with the same source id was overwritten.
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedProduct {
    /// The id from the submitted item.
    pub id: String,
    pub status: ImportStatus,
    /// Catalog id assigned by the store.
    pub ahat_id: String,
}

/// A validated import item. Every field except `id` falls back to a default.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImport {
    /// Provider identifier; becomes the product's `source_id`.
    pub id: String,
    pub asin: String,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub subcategory: Option<String>,
    pub brand: String,
    pub rating: Decimal,
    pub review_count: u32,
    pub image: String,
    pub affiliate_link: String,
    pub features: Vec<String>,
    pub ai_optimization: Option<AiOptimization>,
    pub trending_score: u8,
    pub deal_score: u8,
    pub status: ProductStatus,
}

impl ProductImport {
    /// Materializes the import as a catalog product with the given catalog id.
    #[must_use]
    pub fn into_product(self, ahat_id: String, now: DateTime<Utc>) -> Product {
        Product {
            id: ahat_id,
            source_id: self.id,
            asin: self.asin,
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            subcategory: self.subcategory,
            brand: self.brand,
            rating: self.rating,
            review_count: self.review_count,
            image: self.image,
            affiliate_link: self.affiliate_link,
            features: self.features,
            ai_optimization: self.ai_optimization,
            trending_score: self.trending_score,
            deal_score: self.deal_score,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Absent and `null` fields both take their default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawImport {
    #[serde(deserialize_with = "null_as_default")]
    asin: String,
    title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    description: String,
    price: Option<RawPrice>,
    #[serde(deserialize_with = "null_as_default")]
    category: String,
    subcategory: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    brand: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    rating: Option<Decimal>,
    #[serde(deserialize_with = "null_as_default")]
    review_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    image: String,
    #[serde(deserialize_with = "null_as_default")]
    affiliate_link: String,
    #[serde(deserialize_with = "null_as_default")]
    features: Vec<String>,
    ai_optimization: Option<AiOptimization>,
    #[serde(deserialize_with = "null_as_default")]
    trending_score: u8,
    #[serde(deserialize_with = "null_as_default")]
    deal_score: u8,
    #[serde(deserialize_with = "null_as_default")]
    status: ProductStatus,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    #[serde(with = "rust_decimal::serde::float")]
    original: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    discounted: Option<Decimal>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    discount_percentage: Option<u8>,
}

/// Validates one raw import item.
///
/// # Errors
///
/// Returns [`SkipReason::MissingId`] when the item is not an object or its
/// `id` is absent/null, and [`SkipReason::Invalid`] when the id is unusable
/// or any other field fails to parse or violates the price invariants.
pub fn parse_import_item(item: &Value) -> Result<ProductImport, SkipReason> {
    let id = match item.get("id") {
        None | Some(Value::Null) => return Err(SkipReason::MissingId),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(SkipReason::Invalid(
                "id must be a non-empty string or a number".to_string(),
            ))
        }
    };

    let raw: RawImport = serde_json::from_value(item.clone())
        .map_err(|e| SkipReason::Invalid(e.to_string()))?;

    let price = match raw.price {
        None => Price::from_discount(Decimal::ZERO, 0, DEFAULT_CURRENCY),
        Some(p) => {
            let currency = p.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
            match (p.discounted, p.discount_percentage) {
                (Some(discounted), _) => Price::from_prices(p.original, discounted, currency),
                (None, Some(pct)) => Price::from_discount(p.original, pct, currency),
                (None, None) => Price::from_prices(p.original, p.original, currency),
            }
        }
    }
    .map_err(|e| SkipReason::Invalid(e.to_string()))?;

    let rating = raw.rating.unwrap_or(Decimal::ZERO);
    if rating.is_sign_negative() || rating > Decimal::from(5) {
        return Err(SkipReason::Invalid(format!(
            "rating must be between 0 and 5, got {rating}"
        )));
    }
    for (field, score) in [
        ("trending_score", raw.trending_score),
        ("deal_score", raw.deal_score),
    ] {
        if score > 100 {
            return Err(SkipReason::Invalid(format!(
                "{field} must be between 0 and 100, got {score}"
            )));
        }
    }

    Ok(ProductImport {
        title: raw.title.unwrap_or_else(|| id.clone()),
        id,
        asin: raw.asin,
        description: raw.description,
        price,
        category: raw.category,
        subcategory: raw.subcategory,
        brand: raw.brand,
        rating,
        review_count: raw.review_count,
        image: raw.image,
        affiliate_link: raw.affiliate_link,
        features: raw.features,
        ai_optimization: raw.ai_optimization,
        trending_score: raw.trending_score,
        deal_score: raw.deal_score,
        status: raw.status,
    })
}
