use sqlx::{SqliteConnection, SqlitePool};

use crate::models::SymptomEntryRow;

pub struct NewSymptomEntry<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub symptoms_json: &'a str,
    pub created_at: &'a str,
}

const SQL_INSERT_SYMPTOM_ENTRY: &str = r#"
INSERT INTO symptom_entries (
  id,
  user_id,
  symptoms,
  created_at
) VALUES (?1, ?2, ?3, ?4)
"#;

pub async fn insert_symptom_entry(
    conn: &mut SqliteConnection,
    entry: NewSymptomEntry<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_SYMPTOM_ENTRY)
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.symptoms_json)
        .bind(entry.created_at)
        .execute(conn)
        .await?;
    Ok(())
}

pub const SQL_LIST_SYMPTOM_ENTRIES: &str = r#"
SELECT
  id,
  user_id,
  symptoms,
  created_at
FROM symptom_entries
WHERE user_id = ?1
ORDER BY created_at DESC, id ASC
LIMIT ?2
"#;

/// Newest first. A negative limit means no limit in SQLite.
pub async fn list_symptom_entries(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> sqlx::Result<Vec<SymptomEntryRow>> {
    sqlx::query_as::<_, SymptomEntryRow>(SQL_LIST_SYMPTOM_ENTRIES)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub const SQL_GET_SYMPTOM_ENTRY: &str = r#"
SELECT
  id,
  user_id,
  symptoms,
  created_at
FROM symptom_entries
WHERE id = ?1
  AND user_id = ?2
LIMIT 1
"#;

pub async fn get_symptom_entry(
    pool: &SqlitePool,
    entry_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<SymptomEntryRow>> {
    sqlx::query_as::<_, SymptomEntryRow>(SQL_GET_SYMPTOM_ENTRY)
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_DELETE_SYMPTOM_ENTRY: &str = r#"
DELETE FROM symptom_entries
WHERE id = ?1
  AND user_id = ?2
"#;

/// Predictions go with the entry through the foreign key cascade.
pub async fn delete_symptom_entry(
    pool: &SqlitePool,
    entry_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SYMPTOM_ENTRY)
        .bind(entry_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
