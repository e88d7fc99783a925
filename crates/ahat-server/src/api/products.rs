use ahat_core::{normalize_limit, normalize_page, Pagination, Product, ProductFilter, ProductSort};
use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Path, Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListQuery {
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// An empty value counts as absent and out-of-range integers saturate, so
/// only non-numeric text is rejected.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Some(n));
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(Some(if negative { i64::MIN } else { i64::MAX }));
    }
    Err(de::Error::custom(format!("invalid integer: {raw}")))
}

impl ListQuery {
    fn into_filter(self) -> ProductFilter {
        let non_blank = |s: String| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        ProductFilter {
            page: normalize_page(self.page),
            limit: normalize_limit(self.limit),
            category: self.category.and_then(non_blank),
            search: self.search.and_then(non_blank),
            sort: self
                .sort
                .as_deref()
                .map_or(ProductSort::Newest, ProductSort::parse_lenient),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ProductList {
    success: bool,
    data: Vec<Product>,
    pagination: Pagination,
    meta: ResponseMeta,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ProductList>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let filter = query.into_filter();

    let page = state
        .store
        .list_products(&filter)
        .await
        .map_err(|e| map_db_error("Database error", &e))?;

    Ok(Json(ProductList {
        success: true,
        pagination: Pagination::new(filter.page, filter.limit, page.total),
        data: page.items,
        meta: ResponseMeta::new(req_id.0, &state),
    }))
}

/// Catalog ids are restricted to `[a-zA-Z0-9_-]+`.
pub(super) fn is_valid_product_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    if !is_valid_product_id(&id) {
        return Err(ApiError::RouteNotFound {
            path: uri.path().to_string(),
        });
    }

    let product = state
        .store
        .get_product(&id)
        .await
        .map_err(|e| map_db_error("Database error", &e))?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(ApiResponse::ok(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_pattern() {
        assert!(is_valid_product_id("AHAT-MOCK-1"));
        assert!(is_valid_product_id("abc_123"));
        assert!(!is_valid_product_id(""));
        assert!(!is_valid_product_id("has space"));
        assert!(!is_valid_product_id("dot.ted"));
    }

    fn parse_query(query: &str) -> Result<ListQuery, String> {
        Query::<ListQuery>::try_from_uri(&format!("/products?{query}").parse::<axum::http::Uri>().unwrap())
            .map(|Query(q)| q)
            .map_err(|e| e.body_text())
    }

    #[test]
    fn empty_limit_and_page_use_defaults() {
        let filter = parse_query("limit=&page=").unwrap().into_filter();
        assert_eq!(filter.limit, 20);
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn oversized_integers_saturate_into_the_clamp() {
        let filter = parse_query("limit=99999999999999999999&page=-99999999999999999999")
            .unwrap()
            .into_filter();
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.page, 1);

        let query = parse_query("page=99999999999999999999").unwrap();
        assert_eq!(query.page, Some(i64::MAX));
    }

    #[test]
    fn non_numeric_limit_is_rejected() {
        assert!(parse_query("limit=abc").is_err());
        assert!(parse_query("limit=12abc").is_err());
        assert!(parse_query("page=-").is_err());
    }

    #[test]
    fn blank_filters_are_dropped() {
        let filter = ListQuery {
            category: Some("  ".to_string()),
            search: Some(" sony ".to_string()),
            sort: Some("rating".to_string()),
            limit: Some(500),
            page: Some(0),
            ..ListQuery::default()
        }
        .into_filter();
        assert_eq!(filter.category, None);
        assert_eq!(filter.search.as_deref(), Some("sony"));
        assert_eq!(filter.sort, ProductSort::Rating);
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.page, 1);
    }
}
