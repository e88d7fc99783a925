use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A catalog product as exposed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier, stable across syncs (e.g. `"AHAT-MOCK-7"`).
    pub id: String,
    /// Identifier assigned by the deal provider (e.g. `"SSD-1042"`).
    pub source_id: String,
    /// Amazon Standard Identification Number.
    pub asin: String,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub brand: String,
    /// Average review rating on a 0.0-5.0 scale.
    #[serde(with = "rust_decimal::serde::float")]
    pub rating: Decimal,
    pub review_count: u32,
    pub image: String,
    pub affiliate_link: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_optimization: Option<AiOptimization>,
    pub trending_score: u8,
    pub deal_score: u8,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pricing block of a [`Product`].
///
/// Construct through [`Price::from_discount`] or [`Price::from_prices`] so
/// that `discounted <= original` and `savings` stay consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    #[serde(with = "rust_decimal::serde::float")]
    pub original: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discounted: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    pub discount_percentage: u8,
    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,
}

pub const DEFAULT_CURRENCY: &str = "AUD";

/// Rounds to cents, half away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl Price {
    /// Builds a price from the original amount and a whole-number discount.
    ///
    /// `discounted = round(original * (100 - discount) / 100, 2)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPrice`] if `original` is negative or the
    /// discount exceeds 100.
    pub fn from_discount(
        original: Decimal,
        discount_percentage: u8,
        currency: impl Into<String>,
    ) -> Result<Self, CoreError> {
        if original.is_sign_negative() {
            return Err(CoreError::InvalidPrice(format!(
                "original price must not be negative, got {original}"
            )));
        }
        if discount_percentage > 100 {
            return Err(CoreError::InvalidPrice(format!(
                "discount percentage must be 0-100, got {discount_percentage}"
            )));
        }

        let factor = Decimal::from(100 - discount_percentage) / Decimal::ONE_HUNDRED;
        let discounted = round_money(original * factor);

        Ok(Self {
            original,
            discounted,
            currency: currency.into(),
            discount_percentage,
            savings: round_money(original - discounted),
        })
    }

    /// Builds a price from an original and a discounted amount, deriving the
    /// discount percentage (rounded to the nearest whole percent).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPrice`] if either amount is negative or the
    /// discounted amount exceeds the original.
    pub fn from_prices(
        original: Decimal,
        discounted: Decimal,
        currency: impl Into<String>,
    ) -> Result<Self, CoreError> {
        if original.is_sign_negative() || discounted.is_sign_negative() {
            return Err(CoreError::InvalidPrice(format!(
                "prices must not be negative, got original {original} and discounted {discounted}"
            )));
        }
        if discounted > original {
            return Err(CoreError::InvalidPrice(format!(
                "discounted price {discounted} exceeds original {original}"
            )));
        }

        let discount_percentage = if original.is_zero() {
            0
        } else {
            let pct = ((original - discounted) / original * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            pct.to_u8().unwrap_or(100).min(100)
        };

        Ok(Self {
            original: round_money(original),
            discounted: round_money(discounted),
            currency: currency.into(),
            discount_percentage,
            savings: round_money(original - discounted),
        })
    }
}

/// Content-tooling hints attached to a product. Free-form and unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiOptimization {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub video_angles: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub thumbnail_ideas: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl ProductStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "archived" => Ok(ProductStatus::Archived),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// 1-based position in the listing.
    pub id: u32,
    pub name: String,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    /// Builds a category, attaching the icon for well-known names.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, count: u64) -> Self {
        let name = name.into();
        let icon = category_icon(&name).map(ToOwned::to_owned);
        Self {
            id,
            name,
            count,
            icon,
        }
    }
}

/// Display icon for the storefront's well-known categories.
#[must_use]
pub fn category_icon(name: &str) -> Option<&'static str> {
    match name {
        "Electronics" => Some("💻"),
        "Home & Kitchen" => Some("🏠"),
        "Fashion" => Some("👕"),
        "Beauty" => Some("💄"),
        "Books" => Some("📚"),
        "Sports" => Some("⚽"),
        "Toys & Games" => Some("🎮"),
        "Automotive" => Some("🚗"),
        _ => None,
    }
}

/// Catalog-wide aggregate snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_products: u64,
    pub active_products: u64,
    pub categories_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub trending_score_avg: Decimal,
    pub last_sync: Option<DateTime<Utc>>,
    /// Ordered by `count` descending.
    pub top_categories: Vec<CategoryCount>,
    /// One entry per [`PriceRange`], in bucket order.
    pub price_ranges: Vec<PriceRangeCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRangeCount {
    pub range: &'static str,
    pub count: u64,
}

/// Fixed histogram buckets over the discounted price. Lower bounds are
/// inclusive, upper bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRange {
    UpTo50,
    From50To100,
    From100To200,
    Over200,
}

impl PriceRange {
    pub const ALL: [PriceRange; 4] = [
        PriceRange::UpTo50,
        PriceRange::From50To100,
        PriceRange::From100To200,
        PriceRange::Over200,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PriceRange::UpTo50 => "$0-50",
            PriceRange::From50To100 => "$50-100",
            PriceRange::From100To200 => "$100-200",
            PriceRange::Over200 => "$200+",
        }
    }

    /// Zips bucket counts (in [`PriceRange::ALL`] order) with their labels.
    #[must_use]
    pub fn histogram(counts: [u64; 4]) -> Vec<PriceRangeCount> {
        Self::ALL
            .iter()
            .zip(counts)
            .map(|(range, count)| PriceRangeCount {
                range: range.label(),
                count,
            })
            .collect()
    }
}
