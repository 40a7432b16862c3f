use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::models::DiseasePredictionRow;

pub struct NewDiseasePrediction<'a> {
    pub id: &'a str,
    pub symptom_entry_id: &'a str,
    pub disease_name: &'a str,
    pub probability: f64,
    pub description: &'a str,
    pub precautions_json: &'a str,
    pub medications_json: &'a str,
    pub workouts_json: &'a str,
    pub diets_json: &'a str,
    pub ai_insights_json: Option<&'a str>,
    pub created_at: &'a str,
}

const SQL_INSERT_DISEASE_PREDICTION: &str = r#"
INSERT INTO disease_predictions (
  id,
  symptom_entry_id,
  disease_name,
  probability,
  description,
  precautions,
  medications,
  workouts,
  diets,
  ai_insights,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

pub async fn insert_disease_prediction(
    conn: &mut SqliteConnection,
    p: NewDiseasePrediction<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_DISEASE_PREDICTION)
        .bind(p.id)
        .bind(p.symptom_entry_id)
        .bind(p.disease_name)
        .bind(p.probability)
        .bind(p.description)
        .bind(p.precautions_json)
        .bind(p.medications_json)
        .bind(p.workouts_json)
        .bind(p.diets_json)
        .bind(p.ai_insights_json)
        .bind(p.created_at)
        .execute(conn)
        .await?;
    Ok(())
}

const PREDICTION_COLUMNS: &str = r#"
  p.id,
  p.symptom_entry_id,
  p.disease_name,
  p.probability,
  p.description,
  p.precautions,
  p.medications,
  p.workouts,
  p.diets,
  p.ai_insights,
  p.created_at
"#;

pub async fn list_predictions_for_entry(
    pool: &SqlitePool,
    symptom_entry_id: &str,
) -> sqlx::Result<Vec<DiseasePredictionRow>> {
    let sql = format!(
        r#"
SELECT {PREDICTION_COLUMNS}
FROM disease_predictions p
WHERE p.symptom_entry_id = ?1
ORDER BY p.probability DESC, p.disease_name ASC
"#
    );
    sqlx::query_as::<_, DiseasePredictionRow>(&sql)
        .bind(symptom_entry_id)
        .fetch_all(pool)
        .await
}

/// All predictions belonging to a user's entries, ranked within each entry.
pub async fn list_predictions_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<DiseasePredictionRow>> {
    let sql = format!(
        r#"
SELECT {PREDICTION_COLUMNS}
FROM disease_predictions p
JOIN symptom_entries e
  ON e.id = p.symptom_entry_id
WHERE e.user_id = ?1
ORDER BY p.symptom_entry_id, p.probability DESC, p.disease_name ASC
"#
    );
    sqlx::query_as::<_, DiseasePredictionRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Predictions for the given entries only, ranked within each entry.
pub async fn list_predictions_for_entries(
    pool: &SqlitePool,
    symptom_entry_ids: &[String],
) -> sqlx::Result<Vec<DiseasePredictionRow>> {
    if symptom_entry_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {PREDICTION_COLUMNS} FROM disease_predictions p WHERE p.symptom_entry_id IN ("
    ));
    let mut ids = qb.separated(", ");
    for id in symptom_entry_ids {
        ids.push_bind(id.as_str());
    }
    ids.push_unseparated(") ORDER BY p.symptom_entry_id, p.probability DESC, p.disease_name ASC");

    qb.build_query_as::<DiseasePredictionRow>()
        .fetch_all(pool)
        .await
}

pub async fn list_predictions_with_description(
    pool: &SqlitePool,
    description: &str,
    limit: i64,
) -> sqlx::Result<Vec<DiseasePredictionRow>> {
    let sql = format!(
        r#"
SELECT {PREDICTION_COLUMNS}
FROM disease_predictions p
WHERE p.description = ?1
ORDER BY p.created_at ASC
LIMIT ?2
"#
    );
    sqlx::query_as::<_, DiseasePredictionRow>(&sql)
        .bind(description)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub struct PredictionContentUpdate<'a> {
    pub id: &'a str,
    pub description: &'a str,
    pub precautions_json: &'a str,
    pub medications_json: &'a str,
    pub workouts_json: &'a str,
    pub diets_json: &'a str,
    pub ai_insights_json: Option<&'a str>,
}

const SQL_UPDATE_PREDICTION_CONTENT: &str = r#"
UPDATE disease_predictions
SET description = ?2,
    precautions = ?3,
    medications = ?4,
    workouts = ?5,
    diets = ?6,
    ai_insights = ?7
WHERE id = ?1
"#;

pub async fn update_prediction_content(
    pool: &SqlitePool,
    update: PredictionContentUpdate<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PREDICTION_CONTENT)
        .bind(update.id)
        .bind(update.description)
        .bind(update.precautions_json)
        .bind(update.medications_json)
        .bind(update.workouts_json)
        .bind(update.diets_json)
        .bind(update.ai_insights_json)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn count_predictions_for_entry(
    pool: &SqlitePool,
    symptom_entry_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM disease_predictions WHERE symptom_entry_id = ?1",
    )
    .bind(symptom_entry_id)
    .fetch_one(pool)
    .await
}
