use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::appointments_repo;
use crate::models::AppointmentRow;
use crate::services::prediction_service::now_timestamp;
use crate::services::RecordError;

const STATUSES: [&str; 3] = ["upcoming", "completed", "cancelled"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: String,
    pub doctor_name: String,
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub scheduled_at: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub doctor_name: Option<String>,
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub scheduled_at: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

fn to_view(row: AppointmentRow) -> AppointmentView {
    AppointmentView {
        id: row.id,
        doctor_name: row.doctor_name,
        specialty: row.specialty,
        location: row.location,
        scheduled_at: row.scheduled_at,
        notes: row.notes,
        status: row.status,
        created_at: row.created_at,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Accepts RFC 3339 or the `datetime-local` form (`2025-06-01T09:30`, taken
/// as UTC) and stores RFC 3339 UTC so rows sort chronologically as text.
pub fn normalize_scheduled_at(raw: &str) -> Result<String, RecordError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| RecordError::Invalid(format!("Invalid appointment time: {}", raw)))
}

fn validate_status(raw: &str) -> Result<String, RecordError> {
    let status = raw.trim().to_lowercase();
    if STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(RecordError::Invalid(format!(
            "Status must be one of: {}",
            STATUSES.join(", ")
        )))
    }
}

pub async fn list_appointments(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<AppointmentView>> {
    Ok(appointments_repo::list_appointments(pool, user_id)
        .await?
        .into_iter()
        .map(to_view)
        .collect())
}

pub async fn create_appointment(
    pool: &SqlitePool,
    user_id: &str,
    input: AppointmentInput,
) -> Result<AppointmentView, RecordError> {
    let doctor_name = non_blank(input.doctor_name)
        .ok_or_else(|| RecordError::Invalid("Doctor name is required".to_string()))?;
    let scheduled_at = non_blank(input.scheduled_at)
        .ok_or_else(|| RecordError::Invalid("Appointment time is required".to_string()))?;

    let row = AppointmentRow {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        doctor_name,
        specialty: non_blank(input.specialty),
        location: non_blank(input.location),
        scheduled_at: normalize_scheduled_at(&scheduled_at)?,
        notes: non_blank(input.notes),
        status: validate_status(input.status.as_deref().unwrap_or("upcoming"))?,
        created_at: now_timestamp(),
    };
    appointments_repo::save_appointment(pool, &row).await?;
    Ok(to_view(row))
}

/// Merges the given fields into an owned appointment; `Ok(None)` if the
/// user has no appointment with that id.
pub async fn update_appointment(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    input: AppointmentInput,
) -> Result<Option<AppointmentView>, RecordError> {
    let Some(mut row) = appointments_repo::get_appointment(pool, id, user_id).await? else {
        return Ok(None);
    };

    if let Some(doctor_name) = non_blank(input.doctor_name) {
        row.doctor_name = doctor_name;
    }
    if let Some(scheduled_at) = non_blank(input.scheduled_at) {
        row.scheduled_at = normalize_scheduled_at(&scheduled_at)?;
    }
    if let Some(status) = input.status.as_deref() {
        row.status = validate_status(status)?;
    }
    if input.specialty.is_some() {
        row.specialty = non_blank(input.specialty);
    }
    if input.location.is_some() {
        row.location = non_blank(input.location);
    }
    if input.notes.is_some() {
        row.notes = non_blank(input.notes);
    }

    appointments_repo::save_appointment(pool, &row).await?;
    Ok(Some(to_view(row)))
}

pub async fn delete_appointment(pool: &SqlitePool, user_id: &str, id: &str) -> sqlx::Result<bool> {
    Ok(appointments_repo::delete_appointment(pool, id, user_id).await? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;

    fn input(doctor: &str, at: &str) -> AppointmentInput {
        AppointmentInput {
            doctor_name: Some(doctor.into()),
            scheduled_at: Some(at.into()),
            ..Default::default()
        }
    }

    #[test]
    fn scheduled_at_is_normalized_to_utc() {
        assert_eq!(
            normalize_scheduled_at("2025-06-01T09:30").unwrap(),
            "2025-06-01T09:30:00Z"
        );
        assert_eq!(
            normalize_scheduled_at("2025-06-01T11:30:00+02:00").unwrap(),
            "2025-06-01T09:30:00Z"
        );
        assert!(normalize_scheduled_at("next tuesday").is_err());
    }

    #[tokio::test]
    async fn appointments_are_listed_chronologically() {
        let pool = database::test_pool().await;
        create_appointment(&pool, "u1", input("Dr. Late", "2025-07-01T10:00"))
            .await
            .unwrap();
        create_appointment(&pool, "u1", input("Dr. Early", "2025-06-01T10:00"))
            .await
            .unwrap();
        create_appointment(&pool, "u2", input("Dr. Other", "2025-05-01T10:00"))
            .await
            .unwrap();

        let list = list_appointments(&pool, "u1").await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].doctor_name, "Dr. Early");
        assert_eq!(list[0].status, "upcoming");
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let pool = database::test_pool().await;
        let mut bad = input("Dr. A", "2025-06-01T10:00");
        bad.status = Some("postponed".into());
        let err = create_appointment(&pool, "u1", bad).await.unwrap_err();
        assert!(matches!(err, RecordError::Invalid(_)));
    }

    #[tokio::test]
    async fn update_and_delete_respect_ownership() {
        let pool = database::test_pool().await;
        let created = create_appointment(&pool, "u1", input("Dr. A", "2025-06-01T10:00"))
            .await
            .unwrap();

        let change = AppointmentInput {
            status: Some("completed".into()),
            ..Default::default()
        };
        assert!(update_appointment(&pool, "u2", &created.id, change)
            .await
            .unwrap()
            .is_none());

        let change = AppointmentInput {
            status: Some("Completed".into()),
            notes: Some("bring results".into()),
            ..Default::default()
        };
        let updated = update_appointment(&pool, "u1", &created.id, change)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "completed");
        assert_eq!(updated.notes.as_deref(), Some("bring results"));
        assert_eq!(updated.doctor_name, "Dr. A");

        assert!(!delete_appointment(&pool, "u2", &created.id).await.unwrap());
        assert!(delete_appointment(&pool, "u1", &created.id).await.unwrap());
    }
}
