#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiseasePredictionRow {
    pub id: String,
    pub symptom_entry_id: String,
    pub disease_name: String,
    pub probability: f64,
    pub description: String,
    pub precautions: String,
    pub medications: String,
    pub workouts: String,
    pub diets: String,
    pub ai_insights: Option<String>,
    pub created_at: String,
}
