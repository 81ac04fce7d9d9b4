//! Co-purchase recommendation engine
//!
//! Everything here is synchronous and side-effect free: callers hand in the
//! full transaction corpus and a query product, and get back a ranking. No
//! index or matrix outlives a single call.

pub mod cooccurrence;
pub mod similarity;

pub use cooccurrence::{group_transactions, Cooccurrence, CooccurrenceMatrix, ProductIndex};
pub use similarity::{cosine_similarity, Ranker, ScoredProduct, SimilarityMatrix};

use crate::models::{ProductId, Transaction};

/// Number of recommendations returned when no limit is configured
pub const DEFAULT_LIMIT: usize = 5;

/// Ranks the products most often bought alongside `query`, with scores
pub fn recommend_scored(
    transactions: &[Transaction],
    query: ProductId,
    limit: usize,
) -> Vec<ScoredProduct> {
    let cooccurrence = Cooccurrence::build(transactions);
    Ranker::new(limit).rank(&cooccurrence, query)
}

/// Ranks the products most often bought alongside `query`
pub fn recommend(transactions: &[Transaction], query: ProductId, limit: usize) -> Vec<ProductId> {
    recommend_scored(transactions, query, limit)
        .into_iter()
        .map(|scored| scored.product_id)
        .collect()
}
