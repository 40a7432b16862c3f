use sqlx::SqlitePool;

use crate::models::UserPreferencesRow;

pub const SQL_LOAD_USER_PREFERENCES: &str = r#"
SELECT
  user_id,
  email_notifications,
  push_notifications,
  reminder_notifications,
  theme,
  language,
  font_size,
  share_data,
  anonymous_analytics,
  updated_at
FROM user_preferences
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn load_user_preferences(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Option<UserPreferencesRow>> {
    sqlx::query_as::<_, UserPreferencesRow>(SQL_LOAD_USER_PREFERENCES)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_USER_PREFERENCES: &str = r#"
INSERT INTO user_preferences (
  user_id,
  email_notifications,
  push_notifications,
  reminder_notifications,
  theme,
  language,
  font_size,
  share_data,
  anonymous_analytics,
  updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT (user_id) DO UPDATE SET
  email_notifications = excluded.email_notifications,
  push_notifications = excluded.push_notifications,
  reminder_notifications = excluded.reminder_notifications,
  theme = excluded.theme,
  language = excluded.language,
  font_size = excluded.font_size,
  share_data = excluded.share_data,
  anonymous_analytics = excluded.anonymous_analytics,
  updated_at = excluded.updated_at
"#;

pub async fn upsert_user_preferences(
    pool: &SqlitePool,
    row: &UserPreferencesRow,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_USER_PREFERENCES)
        .bind(&row.user_id)
        .bind(row.email_notifications)
        .bind(row.push_notifications)
        .bind(row.reminder_notifications)
        .bind(&row.theme)
        .bind(&row.language)
        .bind(&row.font_size)
        .bind(row.share_data)
        .bind(row.anonymous_analytics)
        .bind(&row.updated_at)
        .execute(pool)
        .await?;
    Ok(())
}
