use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Models the classifier ensemble reports on, in the order the upstream
/// service documents them.
pub const CLASSIFIER_MODELS: [&str; 3] = ["DecisionTree", "NaiveBayes", "RandomForest"];

pub type ProbabilityMap = BTreeMap<String, f64>;

#[derive(Debug, Deserialize)]
pub struct SymptomsRequest {
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
}

/// Raw body returned by the classifier service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierResponse {
    #[serde(default)]
    pub predicted_probabilities: Option<ProbabilityMap>,
    #[serde(default)]
    pub individual_model_results: Option<BTreeMap<String, ProbabilityMap>>,
    #[serde(default)]
    pub input_symptoms: Option<Vec<String>>,
    #[serde(default)]
    pub iterations_per_model: Option<u64>,
    #[serde(default)]
    pub total_predictions: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsights {
    #[serde(default, deserialize_with = "lenient_text")]
    pub severity: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub recommended_actions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub lifestyle_changes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub warning_signs: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub follow_up_recommendations: Vec<String>,
}

/// Structured guidance the text model produces for one disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseContent {
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub precautions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub medications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub workouts: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub diets: Vec<String>,
    #[serde(default, deserialize_with = "lenient_insights")]
    pub ai_insights: Option<AiInsights>,
}

// Model output is loosely typed: one mistyped field must not cost the others.

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A bare scalar becomes a one-item list; null and objects become empty.
fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

fn lenient_insights<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AiInsights>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseasePrediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_entry_id: Option<String>,
    pub disease_name: String,
    pub probability: f64,
    pub description: String,
    pub precautions: Vec<String>,
    pub medications: Vec<String>,
    pub workouts: Vec<String>,
    pub diets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<AiInsights>,
}

/// Result of one symptom analysis. Classifier fields keep the upstream
/// snake_case names, application fields are camelCase.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub predicted_probabilities: ProbabilityMap,
    pub individual_model_results: BTreeMap<String, ProbabilityMap>,
    pub input_symptoms: Vec<String>,
    pub iterations_per_model: u64,
    pub total_predictions: u64,
    #[serde(rename = "diseasePredictions")]
    pub disease_predictions: Vec<DiseasePrediction>,
    #[serde(rename = "symptomEntryId", skip_serializing_if = "Option::is_none")]
    pub symptom_entry_id: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Flattened top prediction, the shape `/api/predict` has always returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPrediction {
    pub id: String,
    pub created_at: String,
    pub disease: String,
    pub probability: f64,
    pub description: String,
    pub precautions: Vec<String>,
    pub medications: Vec<String>,
    pub workout: Vec<String>,
    pub diet: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomEntry {
    pub id: String,
    pub user_id: String,
    pub symptoms: Vec<String>,
    pub created_at: String,
    pub predictions: Vec<DiseasePrediction>,
}
