use sqlx::SqlitePool;

use crate::models::UsersRow;

pub const SQL_LOAD_USER_PROFILE: &str = r#"
SELECT
  name,
  email,
  age,
  gender,
  image
FROM users
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn load_user_profile(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub struct UserProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub age: Option<i64>,
    pub gender: Option<&'a str>,
}

// NULL parameters keep the stored value.
const SQL_UPDATE_USER_PROFILE: &str = r#"
UPDATE users
SET name = COALESCE(?2, name),
    email = COALESCE(?3, email),
    age = COALESCE(?4, age),
    gender = COALESCE(?5, gender)
WHERE user_id = ?1
"#;

pub async fn update_user_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: UserProfileUpdate<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_USER_PROFILE)
        .bind(user_id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.age)
        .bind(update.gender)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (user_id, name, email)
VALUES (?1, ?2, ?3)
ON CONFLICT (user_id) DO NOTHING
"#;

/// Mirrors a user known to the auth service into the local table.
pub async fn ensure_user(
    pool: &SqlitePool,
    user_id: &str,
    name: Option<&str>,
    email: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_USER)
        .bind(user_id)
        .bind(name)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}
