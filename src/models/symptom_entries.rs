#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SymptomEntryRow {
    pub id: String,
    pub user_id: String,
    /// JSON array of normalized symptom strings.
    pub symptoms: String,
    pub created_at: String,
}
