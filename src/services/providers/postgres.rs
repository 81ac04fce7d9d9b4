use sqlx::PgPool;
use tracing::instrument;

use crate::{
    error::AppResult,
    models::{ProductDetail, ProductId, TransactionRow},
    services::providers::{ProductCatalog, TransactionSource},
};

/// PostgreSQL-backed transaction history and product catalog
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TransactionSource for PgStore {
    #[instrument(skip(self))]
    async fn fetch_transaction_rows(&self) -> AppResult<Vec<TransactionRow>> {
        // Connection goes back to the pool when `conn` drops, on every path
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT invoice, product_id
            FROM transactions
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        tracing::debug!(row_count = rows.len(), "Loaded transaction rows");

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl ProductCatalog for PgStore {
    #[instrument(skip(self), fields(count = ids.len()))]
    async fn fetch_products(&self, ids: &[ProductId]) -> AppResult<Vec<ProductDetail>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let mut conn = self.pool.acquire().await?;

        let products = sqlx::query_as::<_, ProductDetail>(
            r#"
            SELECT id, name, description, price_cents, stock
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(raw_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(products)
    }
}
