use axum::{extract::State, Extension, Json};
use tracing::warn;

use crate::error::ApiError;
use crate::services::preferences_service::{self, UserPreferencesUpdate, UserPreferencesView};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn get_preferences_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<UserPreferencesView>, ApiError> {
    preferences_service::load_or_create_preferences(&state.pool, &auth_user.id)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Preferences load failed for {}: {}", auth_user.id, e);
            ApiError::internal("Failed to fetch preferences")
        })
}

pub async fn update_preferences_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(update): Json<UserPreferencesUpdate>,
) -> Result<Json<UserPreferencesView>, ApiError> {
    preferences_service::update_preferences(&state.pool, &auth_user.id, update)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Preferences update failed for {}: {}", auth_user.id, e);
            ApiError::internal("Failed to update preferences")
        })
}
