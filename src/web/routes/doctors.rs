use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;
use crate::services::doctor_search_service::{
    DoctorResult, DoctorSearch, DoctorSearchError, Specialty, SPECIALTIES,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    lat: Option<f64>,
    lon: Option<f64>,
    specialty: Option<String>,
    radius: Option<u32>,
    limit: Option<u32>,
}

pub async fn specialties_handler() -> Json<&'static [Specialty]> {
    Json(SPECIALTIES)
}

pub async fn search_doctors_handler(
    Query(query): Query<DoctorSearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DoctorResult>>, ApiError> {
    let (Some(lat), Some(lon)) = (query.lat, query.lon) else {
        return Err(ApiError::bad_request("lat and lon are required"));
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(ApiError::bad_request("lat/lon out of range"));
    }
    let Some(specialty) = query.specialty.as_deref().filter(|s| !s.trim().is_empty()) else {
        return Err(ApiError::bad_request("specialty is required"));
    };

    let request = DoctorSearch {
        lat,
        lon,
        specialty,
        radius: query.radius,
        limit: query.limit,
    };

    match state.doctors.search(request).await {
        Ok(results) => Ok(Json(results)),
        Err(DoctorSearchError::UnknownSpecialty(name)) => {
            Err(ApiError::bad_request(format!("Unknown specialty: {}", name)))
        }
        Err(e @ DoctorSearchError::MissingApiKey) => {
            warn!("🏥 Doctor search unavailable: {}", e);
            Err(ApiError::internal("Doctor search is not configured"))
        }
    }
}
