#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MedicationRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub time_of_day: Option<String>,
    pub purpose: Option<String>,
    pub instructions: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub refill_date: Option<String>,
    pub refills_left: i64,
    pub is_active: i64,
    pub created_at: String,
}
