pub mod appointments;
pub mod current_user;
pub mod disease_predictions;
pub mod medications;
pub mod prediction_api_models;
pub mod symptom_entries;
pub mod user_preferences;
pub mod users;

pub use appointments::AppointmentRow;
pub use current_user::CurrentUserRow;
pub use disease_predictions::DiseasePredictionRow;
pub use medications::MedicationRow;
pub use symptom_entries::SymptomEntryRow;
pub use user_preferences::UserPreferencesRow;
pub use users::UsersRow;
