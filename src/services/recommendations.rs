use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use crate::{
    engine::{self, ScoredProduct},
    error::{AppError, AppResult},
    models::{ProductDetail, ProductId, TransactionRow},
    services::providers::{ProductCatalog, TransactionSource},
};

/// Produces "frequently bought together" recommendations
///
/// Every call reloads the transaction history and rebuilds the engine's
/// index and matrices from scratch; nothing is cached between requests.
pub struct RecommendationService {
    transactions: Arc<dyn TransactionSource>,
    catalog: Arc<dyn ProductCatalog>,
    limit: usize,
}

impl RecommendationService {
    pub fn new(
        transactions: Arc<dyn TransactionSource>,
        catalog: Arc<dyn ProductCatalog>,
        limit: usize,
    ) -> Self {
        Self {
            transactions,
            catalog,
            limit,
        }
    }

    /// Details of the products most often co-purchased with `product_id`
    ///
    /// Returned in ranked order. An empty vector means there is nothing to
    /// recommend (unknown product, no co-purchases, or no history at all);
    /// only collaborator failures are errors.
    #[instrument(skip(self))]
    pub async fn recommend(&self, product_id: ProductId) -> AppResult<Vec<ProductDetail>> {
        let start = Instant::now();

        let rows = self.transactions.fetch_transaction_rows().await?;
        let ranked = self.rank(rows, product_id).await?;

        if ranked.is_empty() {
            tracing::info!(product_id = %product_id, "No co-purchase recommendations");
            return Ok(Vec::new());
        }

        tracing::debug!(product_id = %product_id, ranked = ?ranked, "Ranked candidates");

        let ids: Vec<ProductId> = ranked.iter().map(|scored| scored.product_id).collect();
        let details = self.catalog.fetch_products(&ids).await?;
        let recommendations = order_by_rank(&ids, details);

        tracing::info!(
            product_id = %product_id,
            result_count = recommendations.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recommendations computed"
        );

        Ok(recommendations)
    }

    /// Runs the engine off the async executor; it is CPU-bound
    async fn rank(
        &self,
        rows: Vec<TransactionRow>,
        product_id: ProductId,
    ) -> AppResult<Vec<ScoredProduct>> {
        let limit = self.limit;

        tokio::task::spawn_blocking(move || {
            let transactions = engine::group_transactions(rows);
            engine::recommend_scored(&transactions, product_id, limit)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Recommendation task failed: {}", e)))
    }
}

/// Puts catalog records back into ranked order
///
/// The catalog may answer in any order. Ranked ids with no catalog record
/// are dropped.
fn order_by_rank(ranked: &[ProductId], details: Vec<ProductDetail>) -> Vec<ProductDetail> {
    let mut by_id: HashMap<ProductId, ProductDetail> =
        details.into_iter().map(|detail| (detail.id, detail)).collect();

    ranked
        .iter()
        .filter_map(|id| {
            let detail = by_id.remove(id);
            if detail.is_none() {
                tracing::warn!(product_id = %id, "Recommended product missing from catalog");
            }
            detail
        })
        .collect()
}
