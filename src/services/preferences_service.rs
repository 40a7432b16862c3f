use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::database::user_preferences_repo;
use crate::models::UserPreferencesRow;
use crate::services::prediction_service::now_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferencesView {
    pub user_id: String,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub reminder_notifications: bool,
    pub theme: String,
    pub language: String,
    pub font_size: String,
    pub share_data: bool,
    pub anonymous_analytics: bool,
    pub updated_at: String,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferencesUpdate {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub reminder_notifications: Option<bool>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub font_size: Option<String>,
    pub share_data: Option<bool>,
    pub anonymous_analytics: Option<bool>,
}

fn default_preferences(user_id: &str) -> UserPreferencesRow {
    UserPreferencesRow {
        user_id: user_id.to_string(),
        email_notifications: 1,
        push_notifications: 1,
        reminder_notifications: 1,
        theme: "system".to_string(),
        language: "en".to_string(),
        font_size: "medium".to_string(),
        share_data: 0,
        anonymous_analytics: 1,
        updated_at: now_timestamp(),
    }
}

fn to_view(row: UserPreferencesRow) -> UserPreferencesView {
    UserPreferencesView {
        user_id: row.user_id,
        email_notifications: row.email_notifications == 1,
        push_notifications: row.push_notifications == 1,
        reminder_notifications: row.reminder_notifications == 1,
        theme: row.theme,
        language: row.language,
        font_size: row.font_size,
        share_data: row.share_data == 1,
        anonymous_analytics: row.anonymous_analytics == 1,
        updated_at: row.updated_at,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Creates the defaults on first read.
pub async fn load_or_create_preferences(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<UserPreferencesView> {
    if let Some(row) = user_preferences_repo::load_user_preferences(pool, user_id).await? {
        return Ok(to_view(row));
    }
    let row = default_preferences(user_id);
    user_preferences_repo::upsert_user_preferences(pool, &row).await?;
    Ok(to_view(row))
}

pub async fn update_preferences(
    pool: &SqlitePool,
    user_id: &str,
    update: UserPreferencesUpdate,
) -> sqlx::Result<UserPreferencesView> {
    let mut row = user_preferences_repo::load_user_preferences(pool, user_id)
        .await?
        .unwrap_or_else(|| default_preferences(user_id));

    let flag = |v: Option<bool>, current: i64| v.map(i64::from).unwrap_or(current);
    row.email_notifications = flag(update.email_notifications, row.email_notifications);
    row.push_notifications = flag(update.push_notifications, row.push_notifications);
    row.reminder_notifications = flag(update.reminder_notifications, row.reminder_notifications);
    row.share_data = flag(update.share_data, row.share_data);
    row.anonymous_analytics = flag(update.anonymous_analytics, row.anonymous_analytics);
    if let Some(theme) = non_blank(update.theme) {
        row.theme = theme;
    }
    if let Some(language) = non_blank(update.language) {
        row.language = language;
    }
    if let Some(font_size) = non_blank(update.font_size) {
        row.font_size = font_size;
    }
    row.updated_at = now_timestamp();

    user_preferences_repo::upsert_user_preferences(pool, &row).await?;
    Ok(to_view(row))
}
