use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display};

pub mod product;

pub use product::ProductDetail;

/// Identifier of a product in the catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ProductId(pub i64);

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single row from the transaction store: one product on one invoice
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TransactionRow {
    pub invoice: String,
    pub product_id: ProductId,
}

impl TransactionRow {
    pub fn new(invoice: impl Into<String>, product_id: i64) -> Self {
        Self {
            invoice: invoice.into(),
            product_id: ProductId(product_id),
        }
    }
}

/// The distinct products bought together in one purchase
///
/// Quantity is not tracked: a product listed twice on the same invoice
/// counts once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    products: BTreeSet<ProductId>,
}

impl Transaction {
    pub fn new(products: impl IntoIterator<Item = ProductId>) -> Self {
        Self {
            products: products.into_iter().collect(),
        }
    }

    pub fn products(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.products.iter().copied()
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.products.contains(&product_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<ProductId> for Transaction {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Response body of the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub recommendations: Vec<ProductDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_display() {
        assert_eq!(format!("{}", ProductId(42)), "42");
    }

    #[test]
    fn test_product_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&ProductId(7)).unwrap();
        assert_eq!(json, "7");

        let deserialized: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(deserialized, ProductId(7));
    }

    #[test]
    fn test_transaction_collapses_duplicates() {
        let transaction = Transaction::new([ProductId(3), ProductId(1), ProductId(3)]);
        assert_eq!(transaction.len(), 2);
        assert!(transaction.contains(ProductId(1)));
        assert!(transaction.contains(ProductId(3)));
        assert!(!transaction.contains(ProductId(2)));
    }

    #[test]
    fn test_transaction_products_are_ordered() {
        let transaction: Transaction = [ProductId(9), ProductId(2), ProductId(5)]
            .into_iter()
            .collect();
        let products: Vec<ProductId> = transaction.products().collect();
        assert_eq!(products, vec![ProductId(2), ProductId(5), ProductId(9)]);
    }

    #[test]
    fn test_empty_transaction() {
        let transaction = Transaction::default();
        assert!(transaction.is_empty());
        assert_eq!(transaction.products().count(), 0);
    }
}
