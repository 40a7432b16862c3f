#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppointmentRow {
    pub id: String,
    pub user_id: String,
    pub doctor_name: String,
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub scheduled_at: String,
    pub notes: Option<String>,
    pub status: String, // upcoming|completed|cancelled
    pub created_at: String,
}
