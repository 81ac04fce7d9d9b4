use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{ProductDetail, ProductId, TransactionRow},
    services::providers::{ProductCatalog, TransactionSource},
};

/// Transaction history and catalog held in memory
///
/// Read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: Vec<TransactionRow>,
    products: HashMap<ProductId, ProductDetail>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one invoice containing the given products
    pub fn with_transaction(mut self, invoice: &str, product_ids: &[i64]) -> Self {
        self.rows.extend(
            product_ids
                .iter()
                .map(|&id| TransactionRow::new(invoice, id)),
        );
        self
    }

    /// Adds a product to the catalog, replacing any with the same id
    pub fn with_product(mut self, product: ProductDetail) -> Self {
        self.products.insert(product.id, product);
        self
    }
}

#[async_trait::async_trait]
impl TransactionSource for InMemoryStore {
    async fn fetch_transaction_rows(&self) -> AppResult<Vec<TransactionRow>> {
        Ok(self.rows.clone())
    }
}

#[async_trait::async_trait]
impl ProductCatalog for InMemoryStore {
    async fn fetch_products(&self, ids: &[ProductId]) -> AppResult<Vec<ProductDetail>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rows_are_flattened_per_invoice() {
        let store = InMemoryStore::new()
            .with_transaction("INV-1", &[1, 2])
            .with_transaction("INV-2", &[3]);

        let rows = store.fetch_transaction_rows().await.unwrap();
        assert_eq!(
            rows,
            vec![
                TransactionRow::new("INV-1", 1),
                TransactionRow::new("INV-1", 2),
                TransactionRow::new("INV-2", 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_products_skips_unknown_ids() {
        let store = InMemoryStore::new()
            .with_product(ProductDetail::new(1, "Teh Celup", 900))
            .with_product(ProductDetail::new(2, "Susu Kental", 1200));

        let products = store
            .fetch_products(&[ProductId(2), ProductId(99)])
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Susu Kental");
    }

    #[test]
    fn test_fetch_products_empty_input() {
        let store = InMemoryStore::new().with_product(ProductDetail::new(1, "Teh Celup", 900));
        let products = tokio_test::block_on(store.fetch_products(&[])).unwrap();
        assert!(products.is_empty());
    }
}
