use std::sync::Arc;

use crate::services::{
    providers::{ProductCatalog, TransactionSource},
    RecommendationService,
};

/// Shared application state
///
/// Holds no mutable data: each request computes its recommendations from
/// the collaborators' current contents.
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
        }
    }

    /// Builds state around a single store that provides both history and catalog
    pub fn from_store<S>(store: S, limit: usize) -> Self
    where
        S: TransactionSource + ProductCatalog + 'static,
    {
        let store = Arc::new(store);
        Self::new(RecommendationService::new(store.clone(), store, limit))
    }
}
