//! Synthetic catalog used in development, before any deals have been synced.
//!
//! Every call generates fresh random products, so two identical requests
//! return different data. Categories and stats are fixed snapshots.

use ahat_core::{
    AiOptimization, Category, CategoryCount, CoreError, DataSource, ImportStatus, ImportedProduct,
    Price, PriceRange, Product, ProductFilter, ProductImport, ProductPage, ProductStatus, Stats,
    SyncCounts, DEFAULT_CURRENCY,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;

use crate::{new_catalog_id, DbError, ProductStore};

const LIST_CATEGORIES: [&str; 8] = [
    "Electronics",
    "Home & Kitchen",
    "Fashion",
    "Beauty",
    "Books",
    "Sports",
    "Toys & Games",
    "Automotive",
];

const LIST_BRANDS: [&str; 10] = [
    "Sony", "Apple", "Samsung", "Amazon", "Nike", "Adidas", "Lego", "Dyson", "Philips", "Logitech",
];

const DETAIL_CATEGORIES: [&str; 6] = [
    "Electronics",
    "Home & Kitchen",
    "Fashion",
    "Beauty",
    "Books",
    "Sports",
];

const DETAIL_BRANDS: [&str; 6] = ["Sony", "Apple", "Samsung", "Amazon", "Nike", "Adidas"];

const SAMPLE_IMAGE: &str = "https://images.unsplash.com/photo-1505740420928-5e560c06d30e\
                            ?ixlib=rb-4.0.3&auto=format&fit=crop&w=500&q=80";

const SECONDS_PER_DAY: i64 = 86_400;

/// Fixed category table served by the mock catalog.
const CATEGORY_COUNTS: [(&str, u64); 8] = [
    ("Electronics", 45),
    ("Home & Kitchen", 32),
    ("Fashion", 28),
    ("Beauty", 21),
    ("Books", 18),
    ("Sports", 15),
    ("Toys & Games", 12),
    ("Automotive", 8),
];

const PRICE_RANGE_COUNTS: [u64; 4] = [42, 67, 45, 25];

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Generates one page of listing products for `filter`.
///
/// `filter.limit` candidates are drawn; a given `category` is applied to all
/// of them, and candidates failing the search or price bounds are dropped,
/// so the page may come back short.
#[must_use]
pub fn generate_products(filter: &ProductFilter) -> Vec<Product> {
    let mut rng = rand::rng();
    let now = Utc::now();
    let offset = filter.offset();

    (1..=u64::from(filter.limit))
        .filter_map(|n| {
            let category = filter
                .category
                .clone()
                .unwrap_or_else(|| pick(&mut rng, &LIST_CATEGORIES).to_string());
            let brand = pick(&mut rng, &LIST_BRANDS);
            if !filter.matches_search(brand, &category) {
                return None;
            }
            let product = listing_product(&mut rng, offset + n, &category, brand, now).ok()?;
            filter
                .matches_price(product.price.discounted)
                .then_some(product)
        })
        .collect()
}

/// Generates a detail-style product carrying the requested id.
///
/// # Errors
///
/// Returns [`CoreError::InvalidPrice`] if the drawn price is rejected, which
/// the generator's ranges rule out.
pub fn generate_product(id: &str) -> Result<Product, CoreError> {
    let mut rng = rand::rng();
    let now = Utc::now();
    let category = pick(&mut rng, &DETAIL_CATEGORIES);
    let brand = pick(&mut rng, &DETAIL_BRANDS);
    let asin = random_asin(&mut rng);

    let price = Price::from_discount(
        Decimal::new(rng.random_range(1999..=19999), 2),
        rng.random_range(10..=50),
        DEFAULT_CURRENCY,
    )?;
    let age = rng.random_range(SECONDS_PER_DAY..=30 * SECONDS_PER_DAY);
    let created_at = now - Duration::seconds(age);
    let updated_at = updated_after(&mut rng, created_at, now);

    Ok(Product {
        id: id.to_string(),
        source_id: format!("SSD-{}", rng.random_range(1000..=9999)),
        title: format!("{brand} {category} - Premium Edition"),
        description: format!(
            "This is a premium {category} from {brand} with exceptional quality and \
             performance. Perfect for everyday use."
        ),
        price,
        category: category.to_string(),
        subcategory: None,
        brand: brand.to_string(),
        rating: Decimal::new(rng.random_range(35..=50), 1),
        review_count: rng.random_range(10..=5000),
        image: SAMPLE_IMAGE.to_string(),
        affiliate_link: affiliate_link(&asin),
        asin,
        features: strings(&[
            "High-quality materials",
            "Easy to use",
            "Long battery life",
            "Compact design",
        ]),
        ai_optimization: Some(AiOptimization {
            tags: vec![
                category.to_string(),
                brand.to_string(),
                "Amazon".to_string(),
                "Deal".to_string(),
            ],
            video_angles: strings(&[
                "Unboxing experience",
                "Feature showcase",
                "Real-world usage",
            ]),
            hashtags: vec![
                hashtag(category),
                hashtag(brand),
                "#Unboxing".to_string(),
                "#Review".to_string(),
            ],
            thumbnail_ideas: strings(&[
                "Product with glowing effect",
                "Before/after comparison",
                "Size comparison",
            ]),
        }),
        trending_score: rng.random_range(60..=90),
        deal_score: rng.random_range(65..=95),
        status: ProductStatus::Active,
        created_at,
        updated_at,
    })
}

fn listing_product(
    rng: &mut impl Rng,
    n: u64,
    category: &str,
    brand: &str,
    now: DateTime<Utc>,
) -> Result<Product, CoreError> {
    let asin = random_asin(rng);
    let price = Price::from_discount(
        Decimal::new(rng.random_range(1999..=29999), 2),
        rng.random_range(10..=60),
        DEFAULT_CURRENCY,
    )?;
    let created_at = now - Duration::seconds(rng.random_range(0..=30 * SECONDS_PER_DAY));
    let updated_at = updated_after(rng, created_at, now);

    Ok(Product {
        id: format!("AHAT-MOCK-{n}"),
        source_id: format!("SSD-{n}"),
        title: format!("{brand} {category} Product {n}"),
        description: format!(
            "Premium {category} product from {brand} with advanced features and excellent \
             performance."
        ),
        price,
        category: category.to_string(),
        subcategory: None,
        brand: brand.to_string(),
        rating: Decimal::new(rng.random_range(30..=50), 1),
        review_count: rng.random_range(5..=2500),
        image: SAMPLE_IMAGE.to_string(),
        affiliate_link: affiliate_link(&asin),
        asin,
        features: Vec::new(),
        ai_optimization: Some(AiOptimization {
            tags: vec![
                category.to_string(),
                brand.to_string(),
                "Amazon AU".to_string(),
                "Affiliate".to_string(),
            ],
            video_angles: strings(&[
                "Unboxing and first impressions",
                "Comparison with similar products",
                "Long-term review after 30 days",
            ]),
            hashtags: vec![
                hashtag(category),
                hashtag(brand),
                "#AmazonFinds".to_string(),
                "#AffiliateMarketing".to_string(),
            ],
            thumbnail_ideas: strings(&[
                "Product with price tag",
                "Product in use",
                "Comparison shot",
            ]),
        }),
        trending_score: rng.random_range(50..=95),
        deal_score: rng.random_range(60..=95),
        status: ProductStatus::Active,
        created_at,
        updated_at,
    })
}

fn pick<'a>(rng: &mut impl Rng, choices: &[&'a str]) -> &'a str {
    choices.choose(rng).copied().unwrap_or_default()
}

/// `B0` followed by seven random digits, right-padded with zeros to nine.
fn random_asin(rng: &mut impl Rng) -> String {
    format!("B0{:0<9}", rng.random_range(1_000_000..=9_999_999))
}

fn affiliate_link(asin: &str) -> String {
    format!("https://amazon.com.au/dp/{asin}?tag=ahat-20")
}

fn hashtag(word: &str) -> String {
    format!("#{}", word.replace(' ', ""))
}

/// Up to a week before `now`, never earlier than `created_at`.
fn updated_after(
    rng: &mut impl Rng,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    (now - Duration::seconds(rng.random_range(0..=7 * SECONDS_PER_DAY))).max(created_at)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Fixed snapshots
// ---------------------------------------------------------------------------

#[must_use]
pub fn mock_categories() -> Vec<Category> {
    CATEGORY_COUNTS
        .iter()
        .zip(1..)
        .map(|(&(name, count), id)| Category::new(id, name, count))
        .collect()
}

#[must_use]
pub fn mock_stats(now: DateTime<Utc>) -> Stats {
    Stats {
        total_products: 179,
        active_products: 156,
        categories_count: 8,
        average_price: Decimal::new(8999, 2),
        average_discount: Decimal::new(325, 1),
        trending_score_avg: Decimal::new(723, 1),
        last_sync: Some(now - Duration::hours(1)),
        top_categories: CATEGORY_COUNTS
            .iter()
            .take(3)
            .map(|&(name, count)| CategoryCount {
                name: name.to_string(),
                count,
            })
            .collect(),
        price_ranges: PriceRange::histogram(PRICE_RANGE_COUNTS),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// [`ProductStore`] backed by the random generators above. Nothing persists.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProductStore;

#[async_trait]
impl ProductStore for MockProductStore {
    fn source(&self) -> DataSource {
        DataSource::Mock
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, DbError> {
        let mut items = generate_products(filter);
        filter.sort.apply(&mut items);
        Ok(ProductPage {
            total: items.len() as u64,
            items,
        })
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, DbError> {
        Ok(generate_products(filter).len() as u64)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, DbError> {
        Ok(Some(generate_product(id)?))
    }

    async fn import_products(
        &self,
        items: Vec<ProductImport>,
    ) -> Result<Vec<ImportedProduct>, DbError> {
        Ok(items
            .into_iter()
            .map(|item| ImportedProduct {
                id: item.id,
                status: ImportStatus::Imported,
                ahat_id: new_catalog_id(),
            })
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        Ok(mock_categories())
    }

    async fn compute_stats(&self) -> Result<Stats, DbError> {
        Ok(mock_stats(Utc::now()))
    }

    async fn record_sync(&self, _counts: &SyncCounts) -> Result<(), DbError> {
        Ok(())
    }
}
