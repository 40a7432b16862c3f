use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::database::disease_predictions_repo::{self, PredictionContentUpdate};
use crate::models::prediction_api_models::DiseaseContent;
use crate::services::disease_content_service::{self, FALLBACK_DESCRIPTION};
use crate::services::gemini_service::TextModel;
use crate::services::prediction_service::to_json_array;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ContentBackfillReport {
    pub candidates: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Regenerates content for stored predictions that still carry the
/// placeholder description. The model is asked once per disease name.
pub async fn backfill_prediction_content(
    pool: &SqlitePool,
    model: &dyn TextModel,
    limit: i64,
) -> sqlx::Result<ContentBackfillReport> {
    let candidates =
        disease_predictions_repo::list_predictions_with_description(pool, FALLBACK_DESCRIPTION, limit)
            .await?;
    let mut report = ContentBackfillReport {
        candidates: candidates.len(),
        ..Default::default()
    };

    // None marks a disease whose generation failed this run.
    let mut cache: HashMap<String, Option<DiseaseContent>> = HashMap::new();

    for row in candidates {
        if !cache.contains_key(&row.disease_name) {
            let generated =
                match disease_content_service::try_generate_disease_content(model, &row.disease_name)
                    .await
                {
                    Ok(content) => Some(content),
                    Err(e) => {
                        warn!("🩺 Content backfill for {} failed: {}", row.disease_name, e);
                        None
                    }
                };
            cache.insert(row.disease_name.clone(), generated);
        }

        let Some(content) = cache.get(&row.disease_name).and_then(Option::as_ref) else {
            report.failed += 1;
            continue;
        };
        if content.description == FALLBACK_DESCRIPTION {
            report.skipped += 1;
            continue;
        }

        let ai_insights_json = content
            .ai_insights
            .as_ref()
            .and_then(|i| serde_json::to_string(i).ok());
        let updated = disease_predictions_repo::update_prediction_content(
            pool,
            PredictionContentUpdate {
                id: &row.id,
                description: &content.description,
                precautions_json: &to_json_array(&content.precautions),
                medications_json: &to_json_array(&content.medications),
                workouts_json: &to_json_array(&content.workouts),
                diets_json: &to_json_array(&content.diets),
                ai_insights_json: ai_insights_json.as_deref(),
            },
        )
        .await?;

        if updated > 0 {
            report.updated += 1;
        } else {
            report.skipped += 1;
        }
    }

    info!(
        "🩺 Content backfill done: {} candidates, {} updated",
        report.candidates, report.updated
    );
    Ok(report)
}
