use sqlx::SqlitePool;

use crate::models::CurrentUserRow;

pub const SQL_LOAD_CURRENT_USER_ID: &str = r#"
SELECT user_id
FROM current_user
LIMIT 1
"#;

pub async fn load_current_user_id(pool: &SqlitePool) -> sqlx::Result<Option<String>> {
    let row = sqlx::query_as::<_, CurrentUserRow>(SQL_LOAD_CURRENT_USER_ID)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.user_id))
}

const SQL_CLEAR_CURRENT_USER: &str = "DELETE FROM current_user";
const SQL_INSERT_CURRENT_USER: &str = "INSERT INTO current_user (user_id) VALUES (?1)";

/// Replaces the local fallback identity.
pub async fn set_current_user_id(pool: &SqlitePool, user_id: &str) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query(SQL_CLEAR_CURRENT_USER).execute(&mut *tx).await?;
    sqlx::query(SQL_INSERT_CURRENT_USER)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}
