#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserPreferencesRow {
    pub user_id: String,
    pub email_notifications: i64,
    pub push_notifications: i64,
    pub reminder_notifications: i64,
    pub theme: String,
    pub language: String,
    pub font_size: String,
    pub share_data: i64,
    pub anonymous_analytics: i64,
    pub updated_at: String,
}
