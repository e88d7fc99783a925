//! In-memory collaborators for router and sync tests.

use std::{collections::HashSet, sync::Mutex, time::Duration as StdDuration};

use ahat_core::{
    Category, DataSource, ImportStatus, ImportedProduct, Price, Product, ProductFilter,
    ProductImport, ProductPage, ProductStatus, Stats, SyncCounts,
};
use ahat_db::{mock::mock_stats, DbError, ProductStore};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;

pub fn product(id: &str, brand: &str, category: &str, discounted: i64, rating: i64) -> Product {
    let now = Utc::now();
    let discounted = Decimal::from(discounted);
    let price = Price::from_prices(discounted * Decimal::TWO, discounted, "AUD")
        .expect("valid fixture price");
    Product {
        id: id.to_string(),
        source_id: format!("SSD-{id}"),
        asin: "B012345670".to_string(),
        title: format!("{brand} {category}"),
        description: String::new(),
        price,
        category: category.to_string(),
        subcategory: None,
        brand: brand.to_string(),
        rating: Decimal::new(rating, 1),
        review_count: 10,
        image: String::new(),
        affiliate_link: String::new(),
        features: Vec::new(),
        ai_optimization: None,
        trending_score: 50,
        deal_score: 50,
        status: ProductStatus::Active,
        created_at: now - Duration::days(rating),
        updated_at: now,
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub products: Vec<Product>,
    /// Source ids the store already holds; imports of these report `updated`.
    pub existing: HashSet<String>,
    pub fail: bool,
    pub panic: bool,
    /// Stalls `list_products` before answering.
    pub delay: Option<StdDuration>,
    pub imports: Mutex<Vec<ProductImport>>,
    pub syncs: Mutex<Vec<SyncCounts>>,
}

impl FakeStore {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), DbError> {
        assert!(!self.panic, "store exploded");
        if self.fail {
            return Err(DbError::InvalidRow {
                id: "AHAT-1".to_string(),
                reason: "connection reset".to_string(),
            });
        }
        Ok(())
    }

    fn matching(&self, filter: &ProductFilter) -> Vec<Product> {
        let mut items: Vec<Product> = self
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        filter.sort.apply(&mut items);
        items
    }
}

#[async_trait]
impl ProductStore for FakeStore {
    fn source(&self) -> DataSource {
        DataSource::Database
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, DbError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        let items = self.matching(filter);
        let total = items.len() as u64;
        let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        let items = items
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .collect();
        Ok(ProductPage { items, total })
    }

    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, DbError> {
        self.check()?;
        Ok(self.matching(filter).len() as u64)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, DbError> {
        self.check()?;
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn import_products(
        &self,
        items: Vec<ProductImport>,
    ) -> Result<Vec<ImportedProduct>, DbError> {
        self.check()?;
        let results = items
            .iter()
            .enumerate()
            .map(|(i, item)| ImportedProduct {
                id: item.id.clone(),
                status: if self.existing.contains(&item.id) {
                    ImportStatus::Updated
                } else {
                    ImportStatus::Imported
                },
                ahat_id: format!("AHAT-TEST-{i}"),
            })
            .collect();
        self.imports.lock().unwrap().extend(items);
        Ok(results)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        self.check()?;
        Ok(vec![
            Category::new(1, "Electronics", 2),
            Category::new(2, "Gadgets", 1),
        ])
    }

    async fn compute_stats(&self) -> Result<Stats, DbError> {
        self.check()?;
        Ok(mock_stats(Utc::now()))
    }

    async fn record_sync(&self, counts: &SyncCounts) -> Result<(), DbError> {
        self.check()?;
        self.syncs.lock().unwrap().push(*counts);
        Ok(())
    }
}
