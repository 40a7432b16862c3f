use axum::{extract::State, Extension, Json};
use tracing::warn;

use crate::error::ApiError;
use crate::services::user_service::{self, UserProfileUpdate, UserProfileView};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::record_failure;

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

pub async fn get_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<UserProfileView>, ApiError> {
    match user_service::load_user_profile_view(&state.pool, &auth_user.id).await {
        Ok(Some(view)) => Ok(Json(view)),
        Ok(None) => Err(not_found()),
        Err(e) => {
            warn!("User profile load failed for {}: {}", auth_user.id, e);
            Err(ApiError::internal("Failed to fetch profile"))
        }
    }
}

pub async fn update_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(update): Json<UserProfileUpdate>,
) -> Result<Json<UserProfileView>, ApiError> {
    user_service::update_user_profile(&state.pool, &auth_user.id, update)
        .await
        .map_err(|e| record_failure("Profile update", &auth_user.id, "Failed to update profile", e))?
        .map(Json)
        .ok_or_else(not_found)
}
