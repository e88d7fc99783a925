//! `SixSevenDeals` API response types.
//!
//! `GET /deals` answers `{"success": true, "data": [...], "pagination": {...}}`
//! on success and `{"success": false, "error": "..."}` on failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Envelope of the `GET /deals` response.
#[derive(Debug, Deserialize)]
pub struct DealsResponse {
    #[serde(default)]
    pub success: bool,
    /// Raw entries; each is deserialized as a [`Deal`] on its own.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub pagination: Option<DealsPagination>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DealsPagination {
    #[serde(default)]
    pub has_more: bool,
}

/// One deal as published by the provider.
///
/// Prices accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Deal {
    /// Provider id; published as a number but tolerated as a string.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub current_price: Decimal,
    pub original_price: Decimal,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub affiliate_url: Option<String>,
    /// 0-100 popularity score computed by the provider.
    #[serde(default)]
    pub ai_trending_score: Option<Decimal>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}
