use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::medications_repo;
use crate::models::MedicationRow;
use crate::services::prediction_service::now_timestamp;
use crate::services::RecordError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationView {
    pub id: String,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub time_of_day: Option<String>,
    pub purpose: Option<String>,
    pub instructions: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub refill_date: Option<String>,
    pub refills_left: i64,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationInput {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub time_of_day: Option<String>,
    pub purpose: Option<String>,
    pub instructions: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub refill_date: Option<String>,
    pub refills_left: Option<i64>,
    pub is_active: Option<bool>,
}

/// `?status=` filter on the medication list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicationStatus {
    Active,
    Past,
}

impl MedicationStatus {
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        match raw.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "past" => Ok(Self::Past),
            other => Err(RecordError::Invalid(format!(
                "Unknown medication status: {}",
                other
            ))),
        }
    }

    fn is_active(self) -> bool {
        self == Self::Active
    }
}

fn to_view(row: MedicationRow) -> MedicationView {
    MedicationView {
        id: row.id,
        name: row.name,
        dosage: row.dosage,
        frequency: row.frequency,
        time_of_day: row.time_of_day,
        purpose: row.purpose,
        instructions: row.instructions,
        start_date: row.start_date,
        end_date: row.end_date,
        refill_date: row.refill_date,
        refills_left: row.refills_left,
        is_active: row.is_active != 0,
        created_at: row.created_at,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_refills(refills: i64) -> Result<i64, RecordError> {
    if refills < 0 {
        return Err(RecordError::Invalid(
            "Refills left cannot be negative".to_string(),
        ));
    }
    Ok(refills)
}

pub async fn list_medications(
    pool: &SqlitePool,
    user_id: &str,
    status: Option<MedicationStatus>,
) -> sqlx::Result<Vec<MedicationView>> {
    let active = status.map(MedicationStatus::is_active);
    Ok(medications_repo::list_medications(pool, user_id, active)
        .await?
        .into_iter()
        .map(to_view)
        .collect())
}

pub async fn create_medication(
    pool: &SqlitePool,
    user_id: &str,
    input: MedicationInput,
) -> Result<MedicationView, RecordError> {
    let name = non_blank(input.name)
        .ok_or_else(|| RecordError::Invalid("Medication name is required".to_string()))?;

    let row = MedicationRow {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name,
        dosage: non_blank(input.dosage),
        frequency: non_blank(input.frequency),
        time_of_day: non_blank(input.time_of_day),
        purpose: non_blank(input.purpose),
        instructions: non_blank(input.instructions),
        start_date: non_blank(input.start_date),
        end_date: non_blank(input.end_date),
        refill_date: non_blank(input.refill_date),
        refills_left: validate_refills(input.refills_left.unwrap_or(0))?,
        is_active: i64::from(input.is_active.unwrap_or(true)),
        created_at: now_timestamp(),
    };
    medications_repo::save_medication(pool, &row).await?;
    Ok(to_view(row))
}

pub async fn update_medication(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    input: MedicationInput,
) -> Result<Option<MedicationView>, RecordError> {
    let Some(mut row) = medications_repo::get_medication(pool, id, user_id).await? else {
        return Ok(None);
    };

    if let Some(name) = non_blank(input.name) {
        row.name = name;
    }
    if let Some(refills) = input.refills_left {
        row.refills_left = validate_refills(refills)?;
    }
    if let Some(active) = input.is_active {
        row.is_active = i64::from(active);
    }

    let optional = [
        (input.dosage, &mut row.dosage),
        (input.frequency, &mut row.frequency),
        (input.time_of_day, &mut row.time_of_day),
        (input.purpose, &mut row.purpose),
        (input.instructions, &mut row.instructions),
        (input.start_date, &mut row.start_date),
        (input.end_date, &mut row.end_date),
        (input.refill_date, &mut row.refill_date),
    ];
    for (value, field) in optional {
        if value.is_some() {
            *field = non_blank(value);
        }
    }

    medications_repo::save_medication(pool, &row).await?;
    Ok(Some(to_view(row)))
}

pub async fn delete_medication(pool: &SqlitePool, user_id: &str, id: &str) -> sqlx::Result<bool> {
    Ok(medications_repo::delete_medication(pool, id, user_id).await? > 0)
}
