use sqlx::SqlitePool;

use crate::models::MedicationRow;

const MEDICATION_COLUMNS: &str = r#"
  id,
  user_id,
  name,
  dosage,
  frequency,
  time_of_day,
  purpose,
  instructions,
  start_date,
  end_date,
  refill_date,
  refills_left,
  is_active,
  created_at
"#;

/// `active` filters on the flag; `None` lists everything.
pub async fn list_medications(
    pool: &SqlitePool,
    user_id: &str,
    active: Option<bool>,
) -> sqlx::Result<Vec<MedicationRow>> {
    let sql = format!(
        r#"
SELECT {MEDICATION_COLUMNS}
FROM medications
WHERE user_id = ?1
  AND (?2 IS NULL OR is_active = ?2)
ORDER BY is_active DESC, name ASC, id ASC
"#
    );
    sqlx::query_as::<_, MedicationRow>(&sql)
        .bind(user_id)
        .bind(active.map(i64::from))
        .fetch_all(pool)
        .await
}

pub async fn get_medication(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> sqlx::Result<Option<MedicationRow>> {
    let sql = format!(
        r#"
SELECT {MEDICATION_COLUMNS}
FROM medications
WHERE id = ?1
  AND user_id = ?2
LIMIT 1
"#
    );
    sqlx::query_as::<_, MedicationRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_MEDICATION: &str = r#"
INSERT INTO medications (
  id,
  user_id,
  name,
  dosage,
  frequency,
  time_of_day,
  purpose,
  instructions,
  start_date,
  end_date,
  refill_date,
  refills_left,
  is_active,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
ON CONFLICT (id) DO UPDATE SET
  name = excluded.name,
  dosage = excluded.dosage,
  frequency = excluded.frequency,
  time_of_day = excluded.time_of_day,
  purpose = excluded.purpose,
  instructions = excluded.instructions,
  start_date = excluded.start_date,
  end_date = excluded.end_date,
  refill_date = excluded.refill_date,
  refills_left = excluded.refills_left,
  is_active = excluded.is_active
WHERE medications.user_id = excluded.user_id
"#;

pub async fn save_medication(pool: &SqlitePool, row: &MedicationRow) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_MEDICATION)
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.name)
        .bind(&row.dosage)
        .bind(&row.frequency)
        .bind(&row.time_of_day)
        .bind(&row.purpose)
        .bind(&row.instructions)
        .bind(&row.start_date)
        .bind(&row.end_date)
        .bind(&row.refill_date)
        .bind(row.refills_left)
        .bind(row.is_active)
        .bind(&row.created_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_MEDICATION: &str = r#"
DELETE FROM medications
WHERE id = ?1
  AND user_id = ?2
"#;

pub async fn delete_medication(pool: &SqlitePool, id: &str, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_MEDICATION)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
