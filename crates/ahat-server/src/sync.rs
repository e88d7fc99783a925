//! Deal-provider sync: pulls discounted products from `SixSevenDeals` into
//! the catalog, or fabricates a batch when running on mock data.

use std::{collections::HashSet, sync::Arc};

use ahat_core::{
    normalize_limit, ImportStatus, Product, ProductFilter, ProductImport, SyncCounts,
};
use ahat_db::{generate_products, DbError, ProductStore};
use ahat_deals::{normalize_deal, DealsClient, DealsError};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

const DEFAULT_MOCK_COUNT: i64 = 10;
const DEALS_PAGE_SIZE: u32 = 50;

/// Caller-supplied knobs from the sync request body.
#[derive(Debug, Clone, Default)]
pub struct SyncParams {
    /// Mock only: products to fabricate, clamped to `1..=100`.
    pub count: Option<i64>,
    /// Live only: forwarded to the provider.
    pub category: Option<String>,
    /// Live only: page cap, clamped to the configured maximum.
    pub max_pages: Option<u32>,
}

/// The mock provider reports the fabricated products, the live provider a
/// count of inserted rows.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NewProducts {
    Generated(Vec<Product>),
    Inserted(u64),
}

#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub synced: u64,
    pub new_products: NewProducts,
    pub updated: u64,
    pub skipped: u64,
    pub failed: u64,
    #[serde(skip)]
    pub message: Option<&'static str>,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no SixSevenDeals API key available")]
    MissingApiKey,
    #[error(transparent)]
    Deals(#[from] DealsError),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[async_trait]
pub trait DealProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SyncError`] when the provider or the store fails; items that
    /// merely fail normalization are counted, not returned as errors.
    async fn sync(
        &self,
        api_key: Option<&str>,
        params: &SyncParams,
    ) -> Result<SyncOutcome, SyncError>;
}

// ---------------------------------------------------------------------------
// Mock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct MockDealProvider;

#[async_trait]
impl DealProvider for MockDealProvider {
    async fn sync(
        &self,
        _api_key: Option<&str>,
        params: &SyncParams,
    ) -> Result<SyncOutcome, SyncError> {
        let count = normalize_limit(Some(params.count.unwrap_or(DEFAULT_MOCK_COUNT)));
        let products = generate_products(&ProductFilter {
            limit: count,
            ..ProductFilter::default()
        });

        Ok(SyncOutcome {
            synced: u64::from(count),
            new_products: NewProducts::Generated(products),
            updated: 0,
            skipped: 0,
            failed: 0,
            message: Some("Development mode: Mock sync completed"),
        })
    }
}

// ---------------------------------------------------------------------------
// Live
// ---------------------------------------------------------------------------

pub struct LiveDealProvider {
    client: DealsClient,
    store: Arc<dyn ProductStore>,
    max_pages: u32,
}

impl LiveDealProvider {
    #[must_use]
    pub fn new(client: DealsClient, store: Arc<dyn ProductStore>, max_pages: u32) -> Self {
        Self {
            client,
            store,
            max_pages: max_pages.max(1),
        }
    }

    /// Fetches up to `pages` pages, stopping early when the provider reports
    /// no more. Duplicate deal ids, unparseable entries and normalization
    /// failures are tallied.
    async fn collect(
        &self,
        api_key: &str,
        pages: u32,
        category: Option<&str>,
        counts: &mut SyncCounts,
    ) -> Result<Vec<ProductImport>, SyncError> {
        let mut seen = HashSet::new();
        let mut imports = Vec::new();

        for page in 1..=pages {
            let batch = self
                .client
                .fetch_deals(api_key, page, DEALS_PAGE_SIZE, category)
                .await?;
            tracing::debug!(
                page,
                deals = batch.deals.len(),
                rejected = batch.rejected.len(),
                "fetched deals page"
            );

            for rejected in &batch.rejected {
                tracing::warn!(
                    page,
                    deal_id = rejected.id.as_deref().unwrap_or("<none>"),
                    error = %rejected.reason,
                    "deal failed to parse"
                );
                counts.synced += 1;
                counts.failed += 1;
            }

            for deal in &batch.deals {
                counts.synced += 1;
                if !seen.insert(deal.id.clone()) {
                    counts.skipped += 1;
                    continue;
                }
                match normalize_deal(deal) {
                    Ok(import) => imports.push(import),
                    Err(e) => {
                        tracing::warn!(deal_id = %deal.id, error = %e, "deal failed normalization");
                        counts.failed += 1;
                    }
                }
            }

            if !batch.has_more || (batch.deals.is_empty() && batch.rejected.is_empty()) {
                break;
            }
        }

        Ok(imports)
    }
}

#[async_trait]
impl DealProvider for LiveDealProvider {
    async fn sync(
        &self,
        api_key: Option<&str>,
        params: &SyncParams,
    ) -> Result<SyncOutcome, SyncError> {
        let api_key = api_key.ok_or(SyncError::MissingApiKey)?;
        let pages = params
            .max_pages
            .unwrap_or(self.max_pages)
            .clamp(1, self.max_pages);

        let mut counts = SyncCounts::default();
        let imports = self
            .collect(api_key, pages, params.category.as_deref(), &mut counts)
            .await?;

        let results = self.store.import_products(imports).await?;
        for result in &results {
            match result.status {
                ImportStatus::Imported => counts.inserted += 1,
                ImportStatus::Updated => counts.updated += 1,
            }
        }

        self.store.record_sync(&counts).await?;
        tracing::info!(
            synced = counts.synced,
            inserted = counts.inserted,
            updated = counts.updated,
            skipped = counts.skipped,
            failed = counts.failed,
            "deal sync completed"
        );

        Ok(SyncOutcome {
            synced: counts.synced,
            new_products: NewProducts::Inserted(counts.inserted),
            updated: counts.updated,
            skipped: counts.skipped,
            failed: counts.failed,
            message: None,
        })
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
