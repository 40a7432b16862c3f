use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;
use crate::services::medications_service::{
    self, MedicationInput, MedicationStatus, MedicationView,
};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::record_failure;

#[derive(Debug, Deserialize)]
pub struct MedicationListQuery {
    status: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Medication not found".to_string())
}

pub async fn list_medications_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<MedicationListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MedicationView>>, ApiError> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(MedicationStatus::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))?),
        None => None,
    };

    medications_service::list_medications(&state.pool, &auth_user.id, status)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Medications load failed for {}: {}", auth_user.id, e);
            ApiError::internal("Failed to fetch medications")
        })
}

pub async fn create_medication_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(input): Json<MedicationInput>,
) -> Result<(StatusCode, Json<MedicationView>), ApiError> {
    let created = medications_service::create_medication(&state.pool, &auth_user.id, input)
        .await
        .map_err(|e| {
            record_failure("Medication create", &auth_user.id, "Failed to create medication", e)
        })?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_medication_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(medication_id): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<MedicationInput>,
) -> Result<Json<MedicationView>, ApiError> {
    medications_service::update_medication(&state.pool, &auth_user.id, &medication_id, input)
        .await
        .map_err(|e| {
            record_failure("Medication update", &auth_user.id, "Failed to update medication", e)
        })?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn delete_medication_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(medication_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match medications_service::delete_medication(&state.pool, &auth_user.id, &medication_id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(not_found()),
        Err(e) => {
            warn!("Medication {} delete failed: {}", medication_id, e);
            Err(ApiError::internal("Failed to delete medication"))
        }
    }
}
