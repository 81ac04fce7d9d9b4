use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{ProductId, RecommendationResponse},
};

use super::AppState;

/// Query string of the recommendations endpoint
///
/// Kept as raw text so a missing id and a malformed id both surface as
/// our own 400. Query strings the extractor itself cannot decode
/// (repeated keys, bad escapes) are mapped to the same error.
#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub product_id: Option<String>,
}

/// Validates the `product_id` query parameter
pub fn parse_product_id(raw: Option<&str>) -> AppResult<ProductId> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput("product_id is required".to_string()))?;

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(ProductId(id)),
        _ => Err(AppError::InvalidInput(format!(
            "product_id must be a positive integer, got '{}'",
            raw
        ))),
    }
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Products frequently bought together with the requested one
pub async fn get_recommendations(
    State(state): State<AppState>,
    params: Result<Query<RecommendationParams>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(params) =
        params.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    let product_id = parse_product_id(params.product_id.as_deref())?;

    let recommendations = state.recommendations.recommend(product_id).await?;
    if recommendations.is_empty() {
        return Err(AppError::NotFound("No recommendations found".to_string()));
    }

    Ok(Json(RecommendationResponse { recommendations }))
}
