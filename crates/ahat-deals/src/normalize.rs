//! Normalization of `SixSevenDeals` deals into catalog imports.

use ahat_core::{
    round_money, AiOptimization, CoreError, Price, ProductImport, ProductStatus, DEFAULT_CURRENCY,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::types::Deal;

/// Why a deal could not become a catalog product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("deal {0} has an empty title")]
    EmptyTitle(String),
    #[error("deal {id}: {source}")]
    Price {
        id: String,
        #[source]
        source: CoreError,
    },
}

/// Catalog source id for a provider deal id.
#[must_use]
pub fn source_id(deal_id: &str) -> String {
    format!("SSD-{deal_id}")
}

/// Pulls the ASIN out of an Amazon `/dp/{ASIN}` link.
#[must_use]
pub fn asin_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/dp/")?;
    let asin: String = rest
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    (!asin.is_empty()).then_some(asin)
}

fn score(value: Option<Decimal>) -> u8 {
    value
        .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|v| v.to_u8())
        .unwrap_or(0)
        .min(100)
}

/// Converts a deal into a [`ProductImport`] keyed by `SSD-{id}`.
///
/// The rating is clamped to 0-5 and rounded to one decimal; the deal score
/// mirrors the discount percentage.
///
/// # Errors
///
/// Returns [`NormalizeError::EmptyTitle`] for a blank title and
/// [`NormalizeError::Price`] when a price is negative or the current price
/// exceeds the original.
pub fn normalize_deal(deal: &Deal) -> Result<ProductImport, NormalizeError> {
    let title = deal.title.trim();
    if title.is_empty() {
        return Err(NormalizeError::EmptyTitle(deal.id.clone()));
    }

    let price = Price::from_prices(
        round_money(deal.original_price),
        round_money(deal.current_price),
        DEFAULT_CURRENCY,
    )
    .map_err(|source| NormalizeError::Price {
        id: deal.id.clone(),
        source,
    })?;

    let rating = deal
        .rating
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::from(5))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    let affiliate_link = deal.affiliate_url.clone().unwrap_or_default();
    let asin = deal
        .asin
        .clone()
        .filter(|a| !a.trim().is_empty())
        .or_else(|| asin_from_url(&affiliate_link))
        .unwrap_or_default();
    let brand = deal.brand.clone().unwrap_or_default();

    let tags: Vec<String> = [deal.category.as_str(), brand.as_str()]
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    Ok(ProductImport {
        id: source_id(&deal.id),
        asin,
        title: title.to_string(),
        description: deal.description.clone().unwrap_or_default(),
        deal_score: price.discount_percentage,
        price,
        category: deal.category.clone(),
        subcategory: None,
        brand,
        rating,
        review_count: deal.review_count.unwrap_or(0),
        image: deal.image_url.clone().unwrap_or_default(),
        affiliate_link,
        features: deal.features.clone().unwrap_or_default(),
        ai_optimization: (!tags.is_empty()).then(|| AiOptimization {
            tags,
            ..AiOptimization::default()
        }),
        trending_score: score(deal.ai_trending_score),
        status: ProductStatus::Active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(json: serde_json::Value) -> Deal {
        serde_json::from_value(json).expect("valid deal fixture")
    }

    fn headphones() -> Deal {
        deal(serde_json::json!({
            "id": 1,
            "title": "Anker Soundcore Q20i Active Noise Cancelling Headphones",
            "category": "Audio",
            "current_price": 79.00,
            "original_price": 109.99,
            "rating": 4.6,
            "review_count": 5230,
            "image_url": "https://m.media-amazon.com/images/I/61+Q6Rh5O6L._AC_SL1500_.jpg",
            "affiliate_url": "https://www.amazon.com.au/dp/B09X6R9X7N?tag=sixsevendeals-22",
            "ai_trending_score": 92,
            "features": ["Hybrid Active Noise Cancellation", "40-hour playtime with ANC on"]
        }))
    }

    #[test]
    fn normalize_maps_fields_and_derives_discount() {
        let import = normalize_deal(&headphones()).unwrap();
        assert_eq!(import.id, "SSD-1");
        assert_eq!(import.asin, "B09X6R9X7N");
        assert_eq!(import.price.discounted, Decimal::new(7900, 2));
        assert_eq!(import.price.savings, Decimal::new(3099, 2));
        // 30.99 / 109.99 = 28.18% -> 28
        assert_eq!(import.price.discount_percentage, 28);
        assert_eq!(import.deal_score, 28);
        assert_eq!(import.trending_score, 92);
        assert_eq!(import.review_count, 5230);
        assert_eq!(import.features.len(), 2);
        assert_eq!(import.price.currency, "AUD");
    }

    #[test]
    fn current_above_original_fails() {
        let bad = deal(serde_json::json!({
            "id": 2, "title": "Broken", "current_price": 120, "original_price": 100
        }));
        assert!(matches!(
            normalize_deal(&bad),
            Err(NormalizeError::Price { ref id, .. }) if id == "2"
        ));
    }

    #[test]
    fn negative_price_fails() {
        let bad = deal(serde_json::json!({
            "id": 3, "title": "Negative", "current_price": -1, "original_price": 10
        }));
        assert!(normalize_deal(&bad).is_err());
    }

    #[test]
    fn blank_title_fails() {
        let bad = deal(serde_json::json!({
            "id": 4, "title": "   ", "current_price": 1, "original_price": 2
        }));
        assert_eq!(
            normalize_deal(&bad).unwrap_err(),
            NormalizeError::EmptyTitle("4".to_string())
        );
    }

    #[test]
    fn rating_and_score_are_clamped() {
        let wild = deal(serde_json::json!({
            "id": 5, "title": "Wild", "current_price": 1, "original_price": 2,
            "rating": 9.7, "ai_trending_score": 250
        }));
        let import = normalize_deal(&wild).unwrap();
        assert_eq!(import.rating, Decimal::from(5));
        assert_eq!(import.trending_score, 100);
    }

    #[test]
    fn asin_from_url_handles_missing_segment() {
        assert_eq!(
            asin_from_url("https://www.amazon.com.au/dp/B0C1234567?tag=x").as_deref(),
            Some("B0C1234567")
        );
        assert_eq!(asin_from_url("https://example.com/item/1"), None);
        assert_eq!(asin_from_url("https://www.amazon.com.au/dp/"), None);
    }
}
