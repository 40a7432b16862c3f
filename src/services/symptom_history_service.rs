use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::database::{disease_predictions_repo, symptom_entries_repo};
use crate::models::prediction_api_models::{AiInsights, DiseasePrediction, SymptomEntry};
use crate::models::{DiseasePredictionRow, SymptomEntryRow};

fn parse_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}

pub fn prediction_view(row: DiseasePredictionRow) -> DiseasePrediction {
    let ai_insights = row
        .ai_insights
        .as_deref()
        .and_then(|raw| serde_json::from_str::<AiInsights>(raw).ok());

    DiseasePrediction {
        id: Some(row.id),
        symptom_entry_id: Some(row.symptom_entry_id),
        disease_name: row.disease_name,
        probability: row.probability,
        description: row.description,
        precautions: parse_string_list(&row.precautions),
        medications: parse_string_list(&row.medications),
        workouts: parse_string_list(&row.workouts),
        diets: parse_string_list(&row.diets),
        ai_insights,
    }
}

fn entry_view(row: SymptomEntryRow, predictions: Vec<DiseasePrediction>) -> SymptomEntry {
    SymptomEntry {
        symptoms: parse_string_list(&row.symptoms),
        id: row.id,
        user_id: row.user_id,
        created_at: row.created_at,
        predictions,
    }
}

/// Newest entries first, each with its predictions ranked. `limit` of `None`
/// returns the full history.
pub async fn list_symptom_history(
    pool: &SqlitePool,
    user_id: &str,
    limit: Option<i64>,
) -> sqlx::Result<Vec<SymptomEntry>> {
    let entries =
        symptom_entries_repo::list_symptom_entries(pool, user_id, limit.unwrap_or(-1)).await?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    // A bounded page only needs its own predictions, not the whole history.
    let prediction_rows = match limit {
        Some(_) => {
            let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
            disease_predictions_repo::list_predictions_for_entries(pool, &ids).await?
        }
        None => disease_predictions_repo::list_predictions_for_user(pool, user_id).await?,
    };

    let mut by_entry: HashMap<String, Vec<DiseasePrediction>> = HashMap::new();
    for row in prediction_rows {
        by_entry
            .entry(row.symptom_entry_id.clone())
            .or_default()
            .push(prediction_view(row));
    }

    Ok(entries
        .into_iter()
        .map(|row| {
            let predictions = by_entry.remove(&row.id).unwrap_or_default();
            entry_view(row, predictions)
        })
        .collect())
}

pub async fn load_symptom_entry(
    pool: &SqlitePool,
    entry_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<SymptomEntry>> {
    let Some(row) = symptom_entries_repo::get_symptom_entry(pool, entry_id, user_id).await? else {
        return Ok(None);
    };

    let predictions = disease_predictions_repo::list_predictions_for_entry(pool, &row.id)
        .await?
        .into_iter()
        .map(prediction_view)
        .collect();
    Ok(Some(entry_view(row, predictions)))
}

/// Returns false when the entry does not exist or belongs to someone else.
pub async fn delete_symptom_entry(
    pool: &SqlitePool,
    entry_id: &str,
    user_id: &str,
) -> sqlx::Result<bool> {
    let deleted = symptom_entries_repo::delete_symptom_entry(pool, entry_id, user_id).await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{self, disease_predictions_repo::NewDiseasePrediction};
    use crate::database::symptom_entries_repo::NewSymptomEntry;

    async fn seed_entry(pool: &SqlitePool, id: &str, user_id: &str, created_at: &str, diseases: &[(&str, f64)]) {
        let mut conn = pool.acquire().await.unwrap();
        symptom_entries_repo::insert_symptom_entry(
            &mut conn,
            NewSymptomEntry {
                id,
                user_id,
                symptoms_json: r#"["fever","cough"]"#,
                created_at,
            },
        )
        .await
        .unwrap();
        for (name, pct) in diseases {
            let pid = format!("{}-{}", id, name);
            disease_predictions_repo::insert_disease_prediction(
                &mut conn,
                NewDiseasePrediction {
                    id: &pid,
                    symptom_entry_id: id,
                    disease_name: name,
                    probability: *pct,
                    description: "desc",
                    precautions_json: r#"["rest"]"#,
                    medications_json: "[]",
                    workouts_json: "[]",
                    diets_json: "[]",
                    ai_insights_json: Some(r#"{"severity":"Mild"}"#),
                    created_at,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn history_is_newest_first_with_ranked_predictions() {
        let pool = database::test_pool().await;
        seed_entry(&pool, "e1", "u1", "2025-01-01T00:00:00Z", &[("Cold", 20.0), ("Flu", 80.0)]).await;
        seed_entry(&pool, "e2", "u1", "2025-02-01T00:00:00Z", &[("Migraine", 100.0)]).await;
        seed_entry(&pool, "e3", "u2", "2025-03-01T00:00:00Z", &[("Flu", 50.0)]).await;

        let history = list_symptom_history(&pool, "u1", None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, "e2");
        assert_eq!(history[1].predictions[0].disease_name, "Flu");
        assert_eq!(history[1].predictions[1].disease_name, "Cold");
        assert_eq!(history[1].symptoms, vec!["fever".to_string(), "cough".to_string()]);
        assert_eq!(
            history[1].predictions[0].ai_insights.as_ref().unwrap().severity,
            "Mild"
        );

        let limited = list_symptom_history(&pool, "u1", Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "e2");
        assert_eq!(limited[0].predictions.len(), 1);
        assert_eq!(limited[0].predictions[0].disease_name, "Migraine");
    }

    #[tokio::test]
    async fn bounded_page_reads_only_its_own_predictions() {
        let pool = database::test_pool().await;
        seed_entry(&pool, "e1", "u1", "2025-01-01T00:00:00Z", &[("Cold", 20.0), ("Flu", 80.0)]).await;
        seed_entry(&pool, "e2", "u1", "2025-02-01T00:00:00Z", &[("Migraine", 100.0)]).await;
        seed_entry(&pool, "e3", "u1", "2025-03-01T00:00:00Z", &[("Asthma", 60.0), ("Allergy", 40.0)]).await;

        let rows = disease_predictions_repo::list_predictions_for_entries(
            &pool,
            &["e3".to_string(), "e2".to_string()],
        )
        .await
        .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.disease_name.as_str()).collect();
        assert_eq!(names, vec!["Migraine", "Asthma", "Allergy"]);

        assert!(disease_predictions_repo::list_predictions_for_entries(&pool, &[])
            .await
            .unwrap()
            .is_empty());

        let page = list_symptom_history(&pool, "u1", Some(2)).await.unwrap();
        let ids: Vec<&str> = page.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e3", "e2"]);
        assert_eq!(page[0].predictions[0].disease_name, "Asthma");
        assert_eq!(page[1].predictions.len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_predictions() {
        let pool = database::test_pool().await;
        seed_entry(&pool, "e1", "u1", "2025-01-01T00:00:00Z", &[("Cold", 20.0), ("Flu", 80.0)]).await;

        assert!(delete_symptom_entry(&pool, "e1", "u1").await.unwrap());
        let remaining = disease_predictions_repo::count_predictions_for_entry(&pool, "e1")
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(load_symptom_entry(&pool, "e1", "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn other_users_cannot_read_or_delete() {
        let pool = database::test_pool().await;
        seed_entry(&pool, "e1", "u1", "2025-01-01T00:00:00Z", &[("Flu", 80.0)]).await;

        assert!(load_symptom_entry(&pool, "e1", "u2").await.unwrap().is_none());
        assert!(!delete_symptom_entry(&pool, "e1", "u2").await.unwrap());
        assert!(load_symptom_entry(&pool, "e1", "u1").await.unwrap().is_some());
    }
}
