use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::database::user_repo;
use crate::services::RecordError;

#[derive(Debug, Clone, Serialize)]
pub struct UserProfileView {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Accepted as a number or a numeric string.
    pub age: Option<serde_json::Value>,
    pub gender: Option<String>,
}

fn parse_age(value: Option<&serde_json::Value>) -> Result<Option<i64>, RecordError> {
    let age = match value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    match age {
        Some(a) if (0..=150).contains(&a) => Ok(Some(a)),
        _ => Err(RecordError::Invalid("Age must be a number between 0 and 150".to_string())),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn load_user_profile_view(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Option<UserProfileView>> {
    let Some(row) = user_repo::load_user_profile(pool, user_id).await? else {
        return Ok(None);
    };
    Ok(Some(UserProfileView {
        name: row.name,
        email: row.email,
        age: row.age,
        gender: row.gender,
        image: row.image,
    }))
}

/// `Ok(None)` when the user row does not exist.
pub async fn update_user_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: UserProfileUpdate,
) -> Result<Option<UserProfileView>, RecordError> {
    let age = parse_age(update.age.as_ref())?;
    let updated = user_repo::update_user_profile(
        pool,
        user_id,
        user_repo::UserProfileUpdate {
            name: non_blank(update.name.as_deref()),
            email: non_blank(update.email.as_deref()),
            age,
            gender: non_blank(update.gender.as_deref()),
        },
    )
    .await?;

    if updated == 0 {
        return Ok(None);
    }
    Ok(load_user_profile_view(pool, user_id).await?)
}
