//! The storage seam shared by the mock generator and the Postgres catalog.

use ahat_core::{
    Category, DataSource, ImportedProduct, Product, ProductFilter, ProductImport, ProductPage,
    Stats, SyncCounts,
};
use async_trait::async_trait;

use crate::DbError;

/// Product catalog backend. Handlers hold one as `Arc<dyn ProductStore>`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Which backend answered, reported in every response's `meta.source`.
    fn source(&self) -> DataSource;

    /// One page of products plus the total the pagination block reports.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails.
    async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, DbError>;

    /// Number of products matching `filter`, ignoring its page and limit.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails.
    async fn count_products(&self, filter: &ProductFilter) -> Result<u64, DbError>;

    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails. An unknown id is
    /// `Ok(None)`, not an error.
    async fn get_product(&self, id: &str) -> Result<Option<Product>, DbError>;

    /// Inserts or overwrites each item keyed by its source id, in order.
    /// Earlier items stay stored if a later one fails.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on the first write that fails.
    async fn import_products(
        &self,
        items: Vec<ProductImport>,
    ) -> Result<Vec<ImportedProduct>, DbError>;

    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails.
    async fn list_categories(&self) -> Result<Vec<Category>, DbError>;

    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails.
    async fn compute_stats(&self) -> Result<Stats, DbError>;

    /// Persists the tallies of a completed deal sync.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    async fn record_sync(&self, counts: &SyncCounts) -> Result<(), DbError>;
}
