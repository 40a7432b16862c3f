use chrono::{SecondsFormat, Utc};
use futures::future::join_all;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::{disease_predictions_repo, symptom_entries_repo};
use crate::models::prediction_api_models::{
    ClassifierResponse, DiseasePrediction, PredictionReport, ProbabilityMap, TopPrediction,
    CLASSIFIER_MODELS,
};
use crate::services::classifier_service::{ClassifierError, ClassifierGateway};
use crate::services::disease_content_service;
use crate::services::gemini_service::TextModel;

pub const MAX_SYMPTOMS: usize = 5;
pub const MISSING_SYMPTOMS: &str = "Please provide at least one symptom";

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("prediction service unavailable")]
    ClassifierUnavailable(#[source] ClassifierError),
    #[error("invalid response from prediction service: {0}")]
    InvalidClassifierResponse(String),
    #[error("failed to store prediction: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Trims, lower-cases and de-duplicates the submitted symptoms. Runs before
/// any upstream call so oversized requests never reach the classifier.
pub fn normalize_symptoms(raw: &[String]) -> Result<Vec<String>, PredictionError> {
    if raw.len() > MAX_SYMPTOMS {
        return Err(PredictionError::InvalidInput(format!(
            "Maximum {} symptoms allowed",
            MAX_SYMPTOMS
        )));
    }

    let mut seen = HashSet::new();
    let symptoms: Vec<String> = raw
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect();

    if symptoms.is_empty() {
        return Err(PredictionError::InvalidInput(MISSING_SYMPTOMS.to_string()));
    }
    Ok(symptoms)
}

fn clamp_probability(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Mean over the known ensemble models; a disease a model did not report
/// counts as 0 for that model. Names are trimmed before summing so every
/// model contributes to the same key.
fn mean_of_models(per_model: &BTreeMap<String, ProbabilityMap>) -> ProbabilityMap {
    let mut sums: ProbabilityMap = BTreeMap::new();
    for model in CLASSIFIER_MODELS {
        let Some(map) = per_model.get(model) else {
            continue;
        };
        let mut reported: BTreeMap<&str, f64> = BTreeMap::new();
        for (disease, pct) in map {
            let name = disease.trim();
            if name.is_empty() {
                continue;
            }
            let pct = clamp_probability(*pct);
            reported
                .entry(name)
                .and_modify(|existing| *existing = existing.max(pct))
                .or_insert(pct);
        }
        for (name, pct) in reported {
            *sums.entry(name.to_string()).or_insert(0.0) += pct;
        }
    }
    let count = CLASSIFIER_MODELS.len() as f64;
    sums.into_iter().map(|(d, sum)| (d, sum / count)).collect()
}

/// Builds the ranked `(disease, probability)` table: probability descending,
/// disease name ascending on ties.
pub fn probability_table(resp: &ClassifierResponse) -> Result<Vec<(String, f64)>, PredictionError> {
    let raw = match (&resp.predicted_probabilities, &resp.individual_model_results) {
        (Some(combined), _) => combined.clone(),
        (None, Some(per_model))
            if CLASSIFIER_MODELS
                .iter()
                .any(|m| per_model.get(*m).is_some_and(|map| !map.is_empty())) =>
        {
            mean_of_models(per_model)
        }
        _ => {
            return Err(PredictionError::InvalidClassifierResponse(
                "missing predicted_probabilities".to_string(),
            ))
        }
    };

    let mut merged: BTreeMap<String, f64> = BTreeMap::new();
    for (name, pct) in raw {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let pct = clamp_probability(pct);
        merged
            .entry(name.to_string())
            .and_modify(|existing| *existing = existing.max(pct))
            .or_insert(pct);
    }

    let mut table: Vec<(String, f64)> = merged.into_iter().collect();
    table.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(table)
}

fn model_results(resp: &ClassifierResponse) -> BTreeMap<String, ProbabilityMap> {
    let mut results = resp.individual_model_results.clone().unwrap_or_default();
    for model in CLASSIFIER_MODELS {
        results.entry(model.to_string()).or_default();
    }
    results
}

/// One classifier call, then one content call per distinct disease, fanned
/// out concurrently. Content failures degrade per disease.
pub async fn analyze_symptoms(
    classifier: &dyn ClassifierGateway,
    model: &dyn TextModel,
    raw_symptoms: &[String],
) -> Result<PredictionReport, PredictionError> {
    let symptoms = normalize_symptoms(raw_symptoms)?;
    analyze_normalized(classifier, model, &symptoms).await
}

async fn analyze_normalized(
    classifier: &dyn ClassifierGateway,
    model: &dyn TextModel,
    symptoms: &[String],
) -> Result<PredictionReport, PredictionError> {
    let response = classifier
        .predict(symptoms)
        .await
        .map_err(PredictionError::ClassifierUnavailable)?;
    let table = probability_table(&response)?;

    let contents = join_all(
        table
            .iter()
            .map(|(disease, _)| disease_content_service::generate_disease_content(model, disease)),
    )
    .await;

    let disease_predictions: Vec<DiseasePrediction> = table
        .iter()
        .zip(contents)
        .map(|((disease, probability), content)| DiseasePrediction {
            id: None,
            symptom_entry_id: None,
            disease_name: disease.clone(),
            probability: *probability,
            description: content.description,
            precautions: content.precautions,
            medications: content.medications,
            workouts: content.workouts,
            diets: content.diets,
            ai_insights: content.ai_insights,
        })
        .collect();

    info!(
        symptoms = symptoms.len(),
        diseases = disease_predictions.len(),
        "symptom analysis complete"
    );

    Ok(PredictionReport {
        predicted_probabilities: table.iter().cloned().collect(),
        individual_model_results: model_results(&response),
        input_symptoms: response
            .input_symptoms
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| symptoms.to_vec()),
        iterations_per_model: response.iterations_per_model.unwrap_or(0),
        total_predictions: response.total_predictions.unwrap_or(0),
        disease_predictions,
        symptom_entry_id: None,
        created_at: None,
    })
}

/// Analyzes and persists: the entry row first, then its predictions, all in
/// one transaction. Nothing is written when the classifier fails.
pub async fn analyze_and_store(
    pool: &SqlitePool,
    classifier: &dyn ClassifierGateway,
    model: &dyn TextModel,
    user_id: &str,
    raw_symptoms: &[String],
) -> Result<PredictionReport, PredictionError> {
    let symptoms = normalize_symptoms(raw_symptoms)?;
    let mut report = analyze_normalized(classifier, model, &symptoms).await?;

    store_report(pool, user_id, &symptoms, &mut report)
        .await
        .map_err(|e| {
            warn!(user_id = %user_id, error = %e, "storing symptom entry failed");
            PredictionError::Storage(e)
        })?;
    Ok(report)
}

async fn store_report(
    pool: &SqlitePool,
    user_id: &str,
    symptoms: &[String],
    report: &mut PredictionReport,
) -> sqlx::Result<()> {
    let entry_id = Uuid::new_v4().to_string();
    let created_at = now_timestamp();
    let symptoms_json = to_json_array(symptoms);

    let mut tx = pool.begin().await?;
    symptom_entries_repo::insert_symptom_entry(
        &mut *tx,
        symptom_entries_repo::NewSymptomEntry {
            id: &entry_id,
            user_id,
            symptoms_json: &symptoms_json,
            created_at: &created_at,
        },
    )
    .await?;

    for prediction in report.disease_predictions.iter_mut() {
        let id = Uuid::new_v4().to_string();
        let ai_insights_json = prediction
            .ai_insights
            .as_ref()
            .and_then(|i| serde_json::to_string(i).ok());

        disease_predictions_repo::insert_disease_prediction(
            &mut *tx,
            disease_predictions_repo::NewDiseasePrediction {
                id: &id,
                symptom_entry_id: &entry_id,
                disease_name: &prediction.disease_name,
                probability: prediction.probability,
                description: &prediction.description,
                precautions_json: &to_json_array(&prediction.precautions),
                medications_json: &to_json_array(&prediction.medications),
                workouts_json: &to_json_array(&prediction.workouts),
                diets_json: &to_json_array(&prediction.diets),
                ai_insights_json: ai_insights_json.as_deref(),
                created_at: &created_at,
            },
        )
        .await?;

        prediction.id = Some(id);
        prediction.symptom_entry_id = Some(entry_id.clone());
    }
    tx.commit().await?;

    info!(
        entry_id = %entry_id,
        predictions = report.disease_predictions.len(),
        "🩺 Stored symptom entry"
    );
    report.symptom_entry_id = Some(entry_id);
    report.created_at = Some(created_at);
    Ok(())
}

/// Flattens the best-ranked prediction of a stored report.
pub fn top_prediction(report: &PredictionReport) -> Option<TopPrediction> {
    let top = report.disease_predictions.first()?;
    Some(TopPrediction {
        id: report.symptom_entry_id.clone()?,
        created_at: report.created_at.clone()?,
        disease: top.disease_name.clone(),
        probability: top.probability,
        description: top.description.clone(),
        precautions: top.precautions.clone(),
        medications: top.medications.clone(),
        workout: top.workouts.clone(),
        diet: top.diets.clone(),
    })
}

pub fn to_json_array(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{self, disease_predictions_repo, symptom_entries_repo};
    use crate::services::disease_content_service::FALLBACK_DESCRIPTION;
    use crate::services::gemini_service::{GenerateRequest, LlmError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubClassifier {
        response: Option<ClassifierResponse>,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn returning(combined: &[(&str, f64)]) -> Self {
            Self {
                response: Some(ClassifierResponse {
                    predicted_probabilities: Some(
                        combined.iter().map(|(d, p)| (d.to_string(), *p)).collect(),
                    ),
                    ..Default::default()
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ClassifierGateway for StubClassifier {
        async fn predict(&self, _symptoms: &[String]) -> Result<ClassifierResponse, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or(ClassifierError::Status(503))
        }
    }

    /// Answers with valid content except for diseases listed in `broken`.
    struct StubModel {
        broken: Vec<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn new(broken: Vec<&'static str>) -> Self {
            Self {
                broken,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextModel for StubModel {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
            let prompt = request.turns[0].text();
            self.prompts.lock().unwrap().push(prompt.clone());
            if self.broken.iter().any(|d| prompt.contains(&format!("\"{}\"", d))) {
                return Err(LlmError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(r#"```json
{"description": "Generated", "precautions": ["rest"], "medications": ["water"],
 "workouts": ["walk"], "diets": ["soup"]}
```"#
                .to_string())
        }
    }

    fn symptoms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalizes_case_whitespace_and_duplicates() {
        let out = normalize_symptoms(&symptoms(&["  Fever ", "COUGH", "fever", " "])).unwrap();
        assert_eq!(out, vec!["fever".to_string(), "cough".to_string()]);
    }

    #[test]
    fn rejects_more_than_five() {
        let err = normalize_symptoms(&symptoms(&["a", "b", "c", "d", "e", "f"])).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidInput(_)));
    }

    #[test]
    fn rejects_only_blank_symptoms() {
        let err = normalize_symptoms(&symptoms(&["", "   "])).unwrap_err();
        assert_eq!(err.to_string(), "Please provide at least one symptom");
    }

    #[test]
    fn table_is_ranked_by_probability() {
        let resp = StubClassifier::returning(&[("B", 15.0), ("C", 5.0), ("A", 80.0)])
            .response
            .unwrap();
        let table = probability_table(&resp).unwrap();
        assert_eq!(table[0], ("A".to_string(), 80.0));
        assert_eq!(table[1].0, "B");
        assert_eq!(table[2].0, "C");
    }

    #[test]
    fn ties_are_alphabetical() {
        let resp = StubClassifier::returning(&[("Zika", 30.0), ("Malaria", 30.0), ("Flu", 40.0)])
            .response
            .unwrap();
        let names: Vec<String> = probability_table(&resp)
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["Flu", "Malaria", "Zika"]);
    }

    #[test]
    fn probabilities_are_clamped_and_names_merged() {
        let resp = StubClassifier::returning(&[("Flu", 120.0), (" Flu", 10.0), ("Cold", -3.0), ("  ", 50.0)])
            .response
            .unwrap();
        let table = probability_table(&resp).unwrap();
        assert_eq!(table, vec![("Flu".to_string(), 100.0), ("Cold".to_string(), 0.0)]);
    }

    #[test]
    fn per_model_maps_are_averaged_without_combined_map() {
        let mut per_model = BTreeMap::new();
        per_model.insert(
            "DecisionTree".to_string(),
            BTreeMap::from([("Flu".to_string(), 90.0)]),
        );
        per_model.insert(
            "NaiveBayes".to_string(),
            BTreeMap::from([("Flu".to_string(), 60.0), ("Cold".to_string(), 30.0)]),
        );
        per_model.insert(
            "RandomForest".to_string(),
            BTreeMap::from([("Flu".to_string(), 30.0)]),
        );
        let resp = ClassifierResponse {
            individual_model_results: Some(per_model),
            ..Default::default()
        };
        let table = probability_table(&resp).unwrap();
        assert_eq!(table, vec![("Flu".to_string(), 60.0), ("Cold".to_string(), 10.0)]);
    }

    #[test]
    fn per_model_names_are_trimmed_before_averaging() {
        let per_model = BTreeMap::from([
            (
                "DecisionTree".to_string(),
                BTreeMap::from([("Flu".to_string(), 90.0)]),
            ),
            (
                "NaiveBayes".to_string(),
                BTreeMap::from([(" Flu".to_string(), 60.0)]),
            ),
            (
                "RandomForest".to_string(),
                BTreeMap::from([("Flu ".to_string(), 30.0), ("  ".to_string(), 99.0)]),
            ),
        ]);
        let resp = ClassifierResponse {
            individual_model_results: Some(per_model),
            ..Default::default()
        };
        let table = probability_table(&resp).unwrap();
        assert_eq!(table, vec![("Flu".to_string(), 60.0)]);
    }

    #[test]
    fn empty_response_is_invalid() {
        let err = probability_table(&ClassifierResponse::default()).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidClassifierResponse(_)));
    }

    #[tokio::test]
    async fn top_ranked_prediction_is_highest_probability() {
        let classifier = StubClassifier::returning(&[("A", 80.0), ("B", 15.0), ("C", 5.0)]);
        let model = StubModel::new(vec![]);
        let report = analyze_symptoms(&classifier, &model, &symptoms(&["fever"]))
            .await
            .unwrap();

        assert_eq!(report.disease_predictions.len(), 3);
        assert_eq!(report.disease_predictions[0].disease_name, "A");
        assert_eq!(report.disease_predictions[0].probability, 80.0);
        assert_eq!(report.disease_predictions[0].description, "Generated");
        assert_eq!(report.input_symptoms, vec!["fever".to_string()]);
        assert_eq!(report.individual_model_results.len(), 3);
    }

    #[tokio::test]
    async fn content_is_generated_once_per_disease() {
        let classifier = StubClassifier::returning(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]);
        let model = StubModel::new(vec![]);
        analyze_symptoms(&classifier, &model, &symptoms(&["fever", "cough"]))
            .await
            .unwrap();
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.prompt_count(), 3);
    }

    #[tokio::test]
    async fn failed_content_keeps_disease_with_placeholders() {
        let classifier = StubClassifier::returning(&[("A", 70.0), ("B", 30.0)]);
        let model = StubModel::new(vec!["B"]);
        let report = analyze_symptoms(&classifier, &model, &symptoms(&["fever"]))
            .await
            .unwrap();

        let b = &report.disease_predictions[1];
        assert_eq!(b.disease_name, "B");
        assert_eq!(b.description, FALLBACK_DESCRIPTION);
        assert!(!b.precautions.is_empty());
        assert!(!b.medications.is_empty());
        assert!(!b.workouts.is_empty());
        assert!(!b.diets.is_empty());
        assert_eq!(report.disease_predictions[0].description, "Generated");
    }

    #[tokio::test]
    async fn oversized_request_never_reaches_classifier() {
        let classifier = StubClassifier::returning(&[("A", 100.0)]);
        let model = StubModel::new(vec![]);
        let err = analyze_symptoms(
            &classifier,
            &model,
            &symptoms(&["a", "b", "c", "d", "e", "f"]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PredictionError::InvalidInput(_)));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(model.prompt_count(), 0);
    }

    #[tokio::test]
    async fn stored_report_has_entry_and_predictions() {
        let pool = database::test_pool().await;
        let classifier = StubClassifier::returning(&[("A", 80.0), ("B", 15.0), ("C", 5.0)]);
        let model = StubModel::new(vec![]);

        let report = analyze_and_store(&pool, &classifier, &model, "user-1", &symptoms(&["Fever"]))
            .await
            .unwrap();

        let entry_id = report.symptom_entry_id.clone().unwrap();
        let entry = symptom_entries_repo::get_symptom_entry(&pool, &entry_id, "user-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.symptoms, r#"["fever"]"#);

        let rows = disease_predictions_repo::list_predictions_for_entry(&pool, &entry_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].disease_name, "A");
        assert!(report
            .disease_predictions
            .iter()
            .all(|p| p.id.is_some() && p.symptom_entry_id.as_deref() == Some(entry_id.as_str())));

        let top = top_prediction(&report).unwrap();
        assert_eq!(top.id, entry_id);
        assert_eq!(top.disease, "A");
    }

    #[tokio::test]
    async fn classifier_failure_persists_nothing() {
        let pool = database::test_pool().await;
        let classifier = StubClassifier::failing();
        let model = StubModel::new(vec![]);

        let err = analyze_and_store(&pool, &classifier, &model, "user-1", &symptoms(&["fever"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "prediction service unavailable");

        let entries = symptom_entries_repo::list_symptom_entries(&pool, "user-1", -1)
            .await
            .unwrap();
        assert!(entries.is_empty());
        assert_eq!(model.prompt_count(), 0);
    }
}
