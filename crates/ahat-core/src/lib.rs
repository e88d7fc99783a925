pub mod app_config;
pub mod config;
pub mod import;
pub mod products;
pub mod query;
pub mod sync;

pub use app_config::{AppConfig, DataSource, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use import::{
    parse_import_item, ImportStatus, ImportedProduct, ProductImport, SkipReason, SkippedProduct,
};
pub use products::{
    category_icon, round_money, AiOptimization, Category, CategoryCount, Price, PriceRange,
    PriceRangeCount, Product, ProductStatus, Stats, DEFAULT_CURRENCY,
};
pub use query::{normalize_limit, normalize_page, Pagination, ProductFilter, ProductPage, ProductSort};
pub use sync::SyncCounts;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("invalid product status: {0}")]
    InvalidStatus(String),
}
