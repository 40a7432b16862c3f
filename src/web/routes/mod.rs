pub mod appointments;
pub mod auth;
pub mod chat;
pub mod doctors;
pub mod health;
pub mod medications;
pub mod predictions;
pub mod preferences;
pub mod profile;
pub mod recipes;
pub mod symptoms;

use tracing::warn;

use crate::error::ApiError;
use crate::services::RecordError;

/// Bad input becomes a 400 with its message; storage failures are logged
/// and surface as `failure`.
pub(crate) fn record_failure(what: &str, user_id: &str, failure: &str, e: RecordError) -> ApiError {
    match e {
        RecordError::Invalid(msg) => ApiError::BadRequest(msg),
        RecordError::Storage(e) => {
            warn!("{} failed for {}: {}", what, user_id, e);
            ApiError::internal(failure)
        }
    }
}
