use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::warn;

use crate::error::ApiError;
use crate::models::prediction_api_models::{SymptomEntry, SymptomsRequest};
use crate::services::{prediction_service, symptom_history_service};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::predictions::{prediction_failure, symptoms_of};

fn not_found() -> ApiError {
    ApiError::NotFound("Symptom entry not found".to_string())
}

pub async fn list_symptoms_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SymptomEntry>>, ApiError> {
    match symptom_history_service::list_symptom_history(&state.pool, &auth_user.id, None).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            warn!("Symptom history load failed for {}: {}", auth_user.id, e);
            Err(ApiError::internal("Failed to fetch symptoms"))
        }
    }
}

/// Analyzes, stores, and answers with the entry as it now reads back.
pub async fn create_symptom_entry_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    payload: Result<Json<SymptomsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SymptomEntry>), ApiError> {
    let symptoms = symptoms_of(payload)?;
    let report = prediction_service::analyze_and_store(
        &state.pool,
        state.classifier.as_ref(),
        state.text_model.as_ref(),
        &auth_user.id,
        &symptoms,
    )
    .await
    .map_err(|e| prediction_failure(&auth_user.id, e))?;

    let entry_id = report
        .symptom_entry_id
        .ok_or_else(|| ApiError::internal("Failed to save symptoms"))?;

    match symptom_history_service::load_symptom_entry(&state.pool, &entry_id, &auth_user.id).await
    {
        Ok(Some(entry)) => Ok((StatusCode::CREATED, Json(entry))),
        Ok(None) => Err(ApiError::internal("Failed to save symptoms")),
        Err(e) => {
            warn!("Stored entry {} reload failed: {}", entry_id, e);
            Err(ApiError::internal("Failed to save symptoms"))
        }
    }
}

pub async fn get_symptom_entry_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(entry_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SymptomEntry>, ApiError> {
    match symptom_history_service::load_symptom_entry(&state.pool, &entry_id, &auth_user.id).await
    {
        Ok(Some(entry)) => Ok(Json(entry)),
        Ok(None) => Err(not_found()),
        Err(e) => {
            warn!("Symptom entry {} load failed: {}", entry_id, e);
            Err(ApiError::internal("Failed to fetch symptom entry"))
        }
    }
}

pub async fn delete_symptom_entry_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(entry_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match symptom_history_service::delete_symptom_entry(&state.pool, &entry_id, &auth_user.id)
        .await
    {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(not_found()),
        Err(e) => {
            warn!("Symptom entry {} delete failed: {}", entry_id, e);
            Err(ApiError::internal("Failed to delete symptom entry"))
        }
    }
}
