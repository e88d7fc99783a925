pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{DealsClient, DealsPage, RejectedDeal};
pub use error::DealsError;
pub use normalize::{normalize_deal, NormalizeError};
pub use types::{Deal, DealsPagination, DealsResponse};
