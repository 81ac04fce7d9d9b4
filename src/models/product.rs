use serde::{Deserialize, Serialize};

use super::ProductId;

/// Catalog details for a product returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ProductDetail {
    /// Unique identifier for the product
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Optional long-form description
    pub description: Option<String>,
    /// Unit price in cents (e.g., 1599 = 15.99)
    pub price_cents: i64,
    /// Units currently in stock
    pub stock: i32,
}

impl ProductDetail {
    /// Creates a product with no description and nothing in stock
    pub fn new(id: i64, name: impl Into<String>, price_cents: i64) -> Self {
        Self {
            id: ProductId(id),
            name: name.into(),
            description: None,
            price_cents,
            stock: 0,
        }
    }
}
