//! Listing parameters shared by every product store: limit/page
//! normalization, filters, sort orders, and pagination arithmetic.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::products::Product;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Applies the default page size and clamps it to `1..=100`.
#[must_use]
pub fn normalize_limit(limit: Option<i64>) -> u32 {
    let clamped = limit
        .unwrap_or(i64::from(DEFAULT_LIMIT))
        .clamp(1, i64::from(MAX_LIMIT));
    u32::try_from(clamped).unwrap_or(MAX_LIMIT)
}

/// Defaults to page 1 and floors anything below it to 1.
#[must_use]
pub fn normalize_page(page: Option<i64>) -> u32 {
    let clamped = page.unwrap_or(1).clamp(1, i64::from(u32::MAX));
    u32::try_from(clamped).unwrap_or(1)
}

/// Result ordering for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    /// Most recently created first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Highest rating first.
    Rating,
    /// Largest discount percentage first.
    Discount,
}

impl ProductSort {
    /// Parses a `sort` query value. Unknown values fall back to [`ProductSort::Newest`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "price_asc" => ProductSort::PriceAsc,
            "price_desc" => ProductSort::PriceDesc,
            "rating" => ProductSort::Rating,
            "discount" => ProductSort::Discount,
            _ => ProductSort::Newest,
        }
    }

    #[must_use]
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            ProductSort::Newest => b.created_at.cmp(&a.created_at),
            ProductSort::PriceAsc => a.price.discounted.cmp(&b.price.discounted),
            ProductSort::PriceDesc => b.price.discounted.cmp(&a.price.discounted),
            ProductSort::Rating => b.rating.cmp(&a.rating),
            ProductSort::Discount => b
                .price
                .discount_percentage
                .cmp(&a.price.discount_percentage),
        }
    }

    /// Sorts in place. `sort_by` is stable, so ties keep their input order.
    pub fn apply(self, products: &mut [Product]) {
        products.sort_by(|a, b| self.compare(a, b));
    }
}

/// Normalized list request passed to a product store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: ProductSort,
    /// Inclusive lower bound on the discounted price.
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound on the discounted price.
    pub max_price: Option<Decimal>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            category: None,
            search: None,
            sort: ProductSort::Newest,
            min_price: None,
            max_price: None,
        }
    }
}

impl ProductFilter {
    /// Number of rows preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// `search` matches case-insensitively anywhere in `"{brand} {category}"`.
    #[must_use]
    pub fn matches_search(&self, brand: &str, category: &str) -> bool {
        self.search.as_deref().is_none_or(|needle| {
            format!("{brand} {category}")
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
    }

    #[must_use]
    pub fn matches_price(&self, discounted: Decimal) -> bool {
        self.min_price.is_none_or(|min| discounted >= min)
            && self.max_price.is_none_or(|max| discounted <= max)
    }

    /// Full in-memory predicate: category, search, and price bounds.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| product.category == category)
            && self.matches_search(&product.brand, &product.category)
            && self.matches_price(product.price.discounted)
    }
}

/// One page of a product listing together with the store's total.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
    pub has_more: bool,
}

impl Pagination {
    /// `pages = ceil(total / limit)`, `has_more = page * limit < total`.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit_u64 = u64::from(limit.max(1));
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit_u64),
            has_more: u64::from(page) * limit_u64 < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::products::{Price, ProductStatus};

    fn product(id: &str, discounted: &str, rating: &str, discount: u8, age_days: i64) -> Product {
        let now = Utc::now();
        let discounted: Decimal = discounted.parse().unwrap();
        Product {
            id: id.to_string(),
            source_id: format!("SSD-{id}"),
            asin: "B000000000".to_string(),
            title: format!("Product {id}"),
            description: String::new(),
            price: Price {
                original: discounted,
                discounted,
                currency: "AUD".to_string(),
                discount_percentage: discount,
                savings: Decimal::ZERO,
            },
            category: "Electronics".to_string(),
            subcategory: None,
            brand: "Sony".to_string(),
            rating: rating.parse().unwrap(),
            review_count: 0,
            image: String::new(),
            affiliate_link: String::new(),
            features: Vec::new(),
            ai_optimization: None,
            trending_score: 50,
            deal_score: 50,
            status: ProductStatus::Active,
            created_at: now - Duration::days(age_days),
            updated_at: now,
        }
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 20);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(-50)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 100);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn normalize_page_floors_to_one() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(-3)), 1);
        assert_eq!(normalize_page(Some(7)), 7);
    }

    #[test]
    fn sort_parse_falls_back_to_newest() {
        assert_eq!(ProductSort::parse_lenient("rating"), ProductSort::Rating);
        assert_eq!(ProductSort::parse_lenient("cheapest"), ProductSort::Newest);
        assert_eq!(ProductSort::parse_lenient(""), ProductSort::Newest);
    }

    #[test]
    fn price_sorts_are_monotonic() {
        let mut items = vec![
            product("a", "30.00", "4.0", 10, 1),
            product("b", "10.00", "4.0", 10, 1),
            product("c", "20.00", "4.0", 10, 1),
        ];
        ProductSort::PriceAsc.apply(&mut items);
        assert_eq!(ids(&items), ["b", "c", "a"]);
        ProductSort::PriceDesc.apply(&mut items);
        assert_eq!(ids(&items), ["a", "c", "b"]);
    }

    #[test]
    fn rating_and_discount_sort_descending() {
        let mut items = vec![
            product("a", "10.00", "3.5", 40, 1),
            product("b", "10.00", "4.8", 10, 1),
            product("c", "10.00", "4.1", 60, 1),
        ];
        ProductSort::Rating.apply(&mut items);
        assert_eq!(ids(&items), ["b", "c", "a"]);
        ProductSort::Discount.apply(&mut items);
        assert_eq!(ids(&items), ["c", "a", "b"]);
    }

    #[test]
    fn newest_sorts_by_created_at_descending() {
        let mut items = vec![
            product("old", "10.00", "4.0", 10, 20),
            product("new", "10.00", "4.0", 10, 0),
            product("mid", "10.00", "4.0", 10, 5),
        ];
        ProductSort::Newest.apply(&mut items);
        assert_eq!(ids(&items), ["new", "mid", "old"]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut items = vec![
            product("first", "10.00", "4.0", 10, 1),
            product("second", "10.00", "4.0", 10, 1),
            product("third", "10.00", "4.0", 10, 1),
        ];
        ProductSort::PriceAsc.apply(&mut items);
        assert_eq!(ids(&items), ["first", "second", "third"]);
    }

    #[test]
    fn search_is_case_insensitive_over_brand_and_category() {
        let filter = ProductFilter {
            search: Some("sONY elec".to_string()),
            ..ProductFilter::default()
        };
        assert!(filter.matches_search("Sony", "Electronics"));
        assert!(!filter.matches_search("Apple", "Electronics"));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filter = ProductFilter {
            min_price: Some("10.00".parse().unwrap()),
            max_price: Some("20.00".parse().unwrap()),
            ..ProductFilter::default()
        };
        assert!(filter.matches_price("10.00".parse().unwrap()));
        assert!(filter.matches_price("20.00".parse().unwrap()));
        assert!(!filter.matches_price("9.99".parse().unwrap()));
        assert!(!filter.matches_price("20.01".parse().unwrap()));
    }

    #[test]
    fn matches_checks_category() {
        let filter = ProductFilter {
            category: Some("Books".to_string()),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&product("a", "10.00", "4.0", 10, 1)));
    }

    #[test]
    fn offset_skips_previous_pages() {
        let filter = ProductFilter {
            page: 3,
            limit: 25,
            ..ProductFilter::default()
        };
        assert_eq!(filter.offset(), 50);
    }

    #[test]
    fn pagination_arithmetic() {
        let p = Pagination::new(1, 20, 45);
        assert_eq!(p.pages, 3);
        assert!(p.has_more);

        let p = Pagination::new(3, 20, 45);
        assert!(!p.has_more);

        let p = Pagination::new(2, 20, 40);
        assert_eq!(p.pages, 2);
        assert!(!p.has_more);

        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.pages, 0);
        assert!(!p.has_more);
    }
}
