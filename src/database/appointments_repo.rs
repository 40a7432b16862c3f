use sqlx::SqlitePool;

use crate::models::AppointmentRow;

pub const SQL_LIST_APPOINTMENTS: &str = r#"
SELECT
  id,
  user_id,
  doctor_name,
  specialty,
  location,
  scheduled_at,
  notes,
  status,
  created_at
FROM appointments
WHERE user_id = ?1
ORDER BY scheduled_at ASC, id ASC
"#;

pub async fn list_appointments(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<AppointmentRow>> {
    sqlx::query_as::<_, AppointmentRow>(SQL_LIST_APPOINTMENTS)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub const SQL_GET_APPOINTMENT: &str = r#"
SELECT
  id,
  user_id,
  doctor_name,
  specialty,
  location,
  scheduled_at,
  notes,
  status,
  created_at
FROM appointments
WHERE id = ?1
  AND user_id = ?2
LIMIT 1
"#;

pub async fn get_appointment(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> sqlx::Result<Option<AppointmentRow>> {
    sqlx::query_as::<_, AppointmentRow>(SQL_GET_APPOINTMENT)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_APPOINTMENT: &str = r#"
INSERT INTO appointments (
  id,
  user_id,
  doctor_name,
  specialty,
  location,
  scheduled_at,
  notes,
  status,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
ON CONFLICT (id) DO UPDATE SET
  doctor_name = excluded.doctor_name,
  specialty = excluded.specialty,
  location = excluded.location,
  scheduled_at = excluded.scheduled_at,
  notes = excluded.notes,
  status = excluded.status
WHERE appointments.user_id = excluded.user_id
"#;

pub async fn save_appointment(pool: &SqlitePool, row: &AppointmentRow) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_APPOINTMENT)
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.doctor_name)
        .bind(&row.specialty)
        .bind(&row.location)
        .bind(&row.scheduled_at)
        .bind(&row.notes)
        .bind(&row.status)
        .bind(&row.created_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_APPOINTMENT: &str = r#"
DELETE FROM appointments
WHERE id = ?1
  AND user_id = ?2
"#;

pub async fn delete_appointment(pool: &SqlitePool, id: &str, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_APPOINTMENT)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
