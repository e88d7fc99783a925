//! Postgres-backed product catalog.

use ahat_core::{
    round_money, AiOptimization, Category, CategoryCount, DataSource, ImportStatus,
    ImportedProduct, Price, PriceRange, Product, ProductFilter, ProductImport, ProductPage,
    ProductSort, ProductStatus, Stats, SyncCounts,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};

use crate::{new_catalog_id, sync_runs, DbError, ProductStore};

const PRODUCT_COLUMNS: &str = "id, source_id, asin, title, description, category, subcategory, \
     brand, price_original, price_discounted, currency, discount_percentage, rating, \
     review_count, image, affiliate_link, features, ai_optimization, trending_score, \
     deal_score, status, created_at, updated_at";

// Binds: $1 category, $2 search (LIKE-escaped), $3 min price, $4 max price.
const LIST_FILTER: &str = "WHERE ($1::TEXT IS NULL OR category = $1) \
       AND ($2::TEXT IS NULL OR (brand || ' ' || category) ILIKE '%' || $2 || '%' ESCAPE '\\') \
       AND ($3::NUMERIC IS NULL OR price_discounted >= $3) \
       AND ($4::NUMERIC IS NULL OR price_discounted <= $4)";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub source_id: String,
    pub asin: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub brand: String,
    pub price_original: Decimal,
    pub price_discounted: Decimal,
    pub currency: String,
    /// The schema defines this as `SMALLINT` with a `0..=100` check.
    pub discount_percentage: i16,
    pub rating: Decimal,
    pub review_count: i32,
    pub image: String,
    pub affiliate_link: String,
    pub features: Vec<String>,
    pub ai_optimization: Option<Json<AiOptimization>>,
    pub trending_score: i16,
    pub deal_score: i16,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| DbError::InvalidRow {
            id: row.id.clone(),
            reason,
        };
        let discount_percentage = u8::try_from(row.discount_percentage)
            .map_err(|_| invalid(format!("discount_percentage {}", row.discount_percentage)))?;
        let review_count = u32::try_from(row.review_count)
            .map_err(|_| invalid(format!("review_count {}", row.review_count)))?;
        let trending_score = u8::try_from(row.trending_score)
            .map_err(|_| invalid(format!("trending_score {}", row.trending_score)))?;
        let deal_score = u8::try_from(row.deal_score)
            .map_err(|_| invalid(format!("deal_score {}", row.deal_score)))?;
        let status: ProductStatus = row.status.parse().map_err(|_| invalid(row.status.clone()))?;

        Ok(Product {
            price: Price {
                savings: round_money(row.price_original - row.price_discounted),
                original: row.price_original,
                discounted: row.price_discounted,
                currency: row.currency,
                discount_percentage,
            },
            id: row.id,
            source_id: row.source_id,
            asin: row.asin,
            title: row.title,
            description: row.description,
            category: row.category,
            subcategory: row.subcategory,
            brand: row.brand,
            rating: row.rating,
            review_count,
            image: row.image,
            affiliate_link: row.affiliate_link,
            features: row.features,
            ai_optimization: row.ai_optimization.map(|Json(ai)| ai),
            trending_score,
            deal_score,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    name: String,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_products: i64,
    active_products: i64,
    categories_count: i64,
    average_price: Decimal,
    average_discount: Decimal,
    trending_score_avg: Decimal,
    range_0: i64,
    range_1: i64,
    range_2: i64,
    range_3: i64,
}

// ---------------------------------------------------------------------------
// Query helpers
// ---------------------------------------------------------------------------

fn order_clause(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Newest => "created_at DESC, id ASC",
        ProductSort::PriceAsc => "price_discounted ASC, id ASC",
        ProductSort::PriceDesc => "price_discounted DESC, id ASC",
        ProductSort::Rating => "rating DESC, id ASC",
        ProductSort::Discount => "discount_percentage DESC, id ASC",
    }
}

/// Escapes `LIKE` metacharacters so user search text matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn to_i16(value: u8) -> i16 {
    i16::from(value)
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts one import keyed by `source_id`. An existing row keeps its
    /// catalog id and `created_at`.
    async fn upsert_import(&self, item: ProductImport) -> Result<ImportedProduct, DbError> {
        let source_id = item.id.clone();
        let product = item.into_product(new_catalog_id(), Utc::now());

        let (ahat_id, inserted) = sqlx::query_as::<_, (String, bool)>(
            "INSERT INTO products \
                 (id, source_id, asin, title, description, category, subcategory, brand, \
                  price_original, price_discounted, currency, discount_percentage, rating, \
                  review_count, image, affiliate_link, features, ai_optimization, \
                  trending_score, deal_score, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19, $20, $21, NOW(), NOW()) \
             ON CONFLICT (source_id) DO UPDATE SET \
                 asin = EXCLUDED.asin, \
                 title = EXCLUDED.title, \
                 description = EXCLUDED.description, \
                 category = EXCLUDED.category, \
                 subcategory = EXCLUDED.subcategory, \
                 brand = EXCLUDED.brand, \
                 price_original = EXCLUDED.price_original, \
                 price_discounted = EXCLUDED.price_discounted, \
                 currency = EXCLUDED.currency, \
                 discount_percentage = EXCLUDED.discount_percentage, \
                 rating = EXCLUDED.rating, \
                 review_count = EXCLUDED.review_count, \
                 image = EXCLUDED.image, \
                 affiliate_link = EXCLUDED.affiliate_link, \
                 features = EXCLUDED.features, \
                 ai_optimization = EXCLUDED.ai_optimization, \
                 trending_score = EXCLUDED.trending_score, \
                 deal_score = EXCLUDED.deal_score, \
                 status = EXCLUDED.status, \
                 updated_at = NOW() \
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&product.id)
        .bind(&product.source_id)
        .bind(&product.asin)
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.subcategory.as_deref())
        .bind(&product.brand)
        .bind(product.price.original)
        .bind(product.price.discounted)
        .bind(&product.price.currency)
        .bind(to_i16(product.price.discount_percentage))
        .bind(product.rating)
        .bind(i32::try_from(product.review_count).unwrap_or(i32::MAX))
        .bind(&product.image)
        .bind(&product.affiliate_link)
        .bind(&product.features)
        .bind(product.ai_optimization.as_ref().map(Json))
        .bind(to_i16(product.trending_score))
        .bind(to_i16(product.deal_score))
        .bind(product.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(ImportedProduct {
            id: source_id,
            status: if inserted {
                ImportStatus::Imported
            } else {
                ImportStatus::Updated
            },
            ahat_id,
        })
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    fn source(&self) -> DataSource {
        DataSource::Database
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, DbError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {LIST_FILTER} \
             ORDER BY {} LIMIT $5 OFFSET $6",
            order_clause(filter.sort)
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.search.as_deref().map(escape_like))
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(i64::from(filter.limit))
            .bind(i64::try_from(filter.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total = self.count_products(filter).await?;

        Ok(ProductPage { items, total })
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, DbError> {
        let sql = format!("SELECT COUNT(*) FROM products {LIST_FILTER}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.search.as_deref().map(escape_like))
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_one(&self.pool)
            .await?;

        Ok(to_u64(count))
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, DbError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn import_products(
        &self,
        items: Vec<ProductImport>,
    ) -> Result<Vec<ImportedProduct>, DbError> {
        let mut imported = Vec::with_capacity(items.len());
        for item in items {
            imported.push(self.upsert_import(item).await?);
        }
        Ok(imported)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT category AS name, COUNT(*) AS count \
             FROM products \
             WHERE category <> '' \
             GROUP BY category \
             ORDER BY count DESC, category ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .zip(1..)
            .map(|(row, id)| Category::new(id, row.name, to_u64(row.count)))
            .collect())
    }

    async fn compute_stats(&self) -> Result<Stats, DbError> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT COUNT(*) AS total_products, \
                    COUNT(*) FILTER (WHERE status = 'active') AS active_products, \
                    COUNT(DISTINCT category) FILTER (WHERE category <> '') AS categories_count, \
                    COALESCE(ROUND(AVG(price_discounted), 2), 0) AS average_price, \
                    COALESCE(ROUND(AVG(discount_percentage), 1), 0) AS average_discount, \
                    COALESCE(ROUND(AVG(trending_score), 1), 0) AS trending_score_avg, \
                    COUNT(*) FILTER (WHERE price_discounted < 50) AS range_0, \
                    COUNT(*) FILTER (WHERE price_discounted >= 50 AND price_discounted < 100) \
                        AS range_1, \
                    COUNT(*) FILTER (WHERE price_discounted >= 100 AND price_discounted < 200) \
                        AS range_2, \
                    COUNT(*) FILTER (WHERE price_discounted >= 200) AS range_3 \
             FROM products",
        )
        .fetch_one(&self.pool)
        .await?;

        let top_categories = self
            .list_categories()
            .await?
            .into_iter()
            .take(3)
            .map(|c| CategoryCount {
                name: c.name,
                count: c.count,
            })
            .collect();
        let last_sync = sync_runs::last_completed_at(&self.pool).await?;

        Ok(Stats {
            total_products: to_u64(row.total_products),
            active_products: to_u64(row.active_products),
            categories_count: to_u64(row.categories_count),
            average_price: row.average_price,
            average_discount: row.average_discount,
            trending_score_avg: row.trending_score_avg,
            last_sync,
            top_categories,
            price_ranges: PriceRange::histogram(
                [row.range_0, row.range_1, row.range_2, row.range_3].map(to_u64),
            ),
        })
    }

    async fn record_sync(&self, counts: &SyncCounts) -> Result<(), DbError> {
        sync_runs::insert_sync_run(&self.pool, counts).await
    }
}
