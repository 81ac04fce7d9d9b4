//! Data collaborators of the recommendation service
//!
//! The engine never talks to storage directly. It is handed transaction rows
//! by a `TransactionSource` and resolves ranked ids through a `ProductCatalog`,
//! so the backing store can be swapped (PostgreSQL in production, in-memory
//! for tests and local runs).

use crate::{
    error::AppResult,
    models::{ProductDetail, ProductId, TransactionRow},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Supplies the full purchase history
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch every (invoice, product) row
    ///
    /// Rows sharing an invoice belong to the same transaction. Zero rows is a
    /// valid answer.
    async fn fetch_transaction_rows(&self) -> AppResult<Vec<TransactionRow>>;
}

/// Resolves product identifiers to catalog details
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch details for the given products, in any order
    ///
    /// Unknown ids are simply absent from the result. An empty input returns
    /// an empty result.
    async fn fetch_products(&self, ids: &[ProductId]) -> AppResult<Vec<ProductDetail>>;
}
