pub mod appointments_service;
pub mod auth_service;
pub mod chat_assistant_service;
pub mod classifier_service;
pub mod content_backfill_service;
pub mod disease_content_service;
pub mod doctor_search_service;
pub mod gemini_service;
pub mod medications_service;
pub mod prediction_service;
pub mod preferences_service;
pub mod recipe_service;
pub mod symptom_history_service;
pub mod user_service;

/// Failure of a user-owned record operation: bad input or storage.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}
