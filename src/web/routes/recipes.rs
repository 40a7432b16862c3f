use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecipeSearchQuery {
    query: Option<String>,
}

pub async fn search_recipes_handler(
    Query(params): Query<RecipeSearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let Some(query) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Err(ApiError::bad_request("Query parameter is required"));
    };

    state.recipes.search(query).await.map(Json).map_err(|e| {
        warn!("🥗 Recipe search '{}' failed: {}", query, e);
        ApiError::internal("Failed to fetch recipes")
    })
}

pub async fn recipe_detail_handler(
    Path(recipe_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    state
        .recipes
        .information(recipe_id)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("🥗 Recipe {} lookup failed: {}", recipe_id, e);
            ApiError::internal("Failed to fetch recipe")
        })
}
