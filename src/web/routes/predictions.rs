use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::prediction_api_models::{PredictionReport, SymptomsRequest, TopPrediction};
use crate::services::prediction_service::{self, PredictionError};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

/// Validation reaches the client verbatim; everything else stays in the logs.
pub(crate) fn prediction_failure(who: &str, e: PredictionError) -> ApiError {
    match e {
        PredictionError::InvalidInput(msg) => ApiError::BadRequest(msg),
        PredictionError::ClassifierUnavailable(source) => {
            warn!("🩺 Prediction for {} failed: classifier unavailable: {}", who, source);
            ApiError::internal("Prediction service unavailable")
        }
        other => {
            warn!("🩺 Prediction for {} failed: {}", who, other);
            ApiError::internal("Failed to process symptoms")
        }
    }
}

/// A body that is not `{"symptoms": [string, ...]}` is a bad request, the
/// same as an empty list.
pub(crate) fn symptoms_of(
    payload: Result<Json<SymptomsRequest>, JsonRejection>,
) -> Result<Vec<String>, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body.symptoms.unwrap_or_default()),
        Err(rejection) => {
            debug!("Rejected symptoms body: {}", rejection.body_text());
            Err(ApiError::bad_request(prediction_service::MISSING_SYMPTOMS))
        }
    }
}

pub async fn disease_prediction_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    payload: Result<Json<SymptomsRequest>, JsonRejection>,
) -> Result<Json<PredictionReport>, ApiError> {
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
    Ok(Json(report))
}

/// Public variant: same analysis, nothing stored.
pub async fn free_symptoms_handler(
    State(state): State<AppState>,
    payload: Result<Json<SymptomsRequest>, JsonRejection>,
) -> Result<Json<PredictionReport>, ApiError> {
    let symptoms = symptoms_of(payload)?;
    let report = prediction_service::analyze_symptoms(
        state.classifier.as_ref(),
        state.text_model.as_ref(),
        &symptoms,
    )
    .await
    .map_err(|e| prediction_failure("anonymous", e))?;
    Ok(Json(report))
}

pub async fn predict_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    payload: Result<Json<SymptomsRequest>, JsonRejection>,
) -> Result<Json<TopPrediction>, ApiError> {
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

    prediction_service::top_prediction(&report)
        .map(Json)
        .ok_or_else(|| ApiError::internal("No predictions returned"))
}
