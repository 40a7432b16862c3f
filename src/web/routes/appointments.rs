use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::warn;

use crate::error::ApiError;
use crate::services::appointments_service::{self, AppointmentInput, AppointmentView};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::record_failure;

fn not_found() -> ApiError {
    ApiError::NotFound("Appointment not found".to_string())
}

pub async fn list_appointments_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentView>>, ApiError> {
    appointments_service::list_appointments(&state.pool, &auth_user.id)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Appointments load failed for {}: {}", auth_user.id, e);
            ApiError::internal("Failed to fetch appointments")
        })
}

pub async fn create_appointment_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(input): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<AppointmentView>), ApiError> {
    let created = appointments_service::create_appointment(&state.pool, &auth_user.id, input)
        .await
        .map_err(|e| {
            record_failure("Appointment create", &auth_user.id, "Failed to create appointment", e)
        })?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_appointment_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(appointment_id): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<AppointmentInput>,
) -> Result<Json<AppointmentView>, ApiError> {
    appointments_service::update_appointment(&state.pool, &auth_user.id, &appointment_id, input)
        .await
        .map_err(|e| {
            record_failure("Appointment update", &auth_user.id, "Failed to update appointment", e)
        })?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn delete_appointment_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(appointment_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    match appointments_service::delete_appointment(&state.pool, &auth_user.id, &appointment_id).await
    {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(not_found()),
        Err(e) => {
            warn!("Appointment {} delete failed: {}", appointment_id, e);
            Err(ApiError::internal("Failed to delete appointment"))
        }
    }
}
