use tracing::warn;

use crate::models::prediction_api_models::{AiInsights, DiseaseContent};
use crate::services::gemini_service::{GenerateRequest, LlmError, TextModel};

/// Description stored when the model could not produce content. The
/// backfill binary looks for it to find rows worth regenerating.
pub const FALLBACK_DESCRIPTION: &str = "Information not available";

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content model failed: {0}")]
    Model(#[from] LlmError),
    #[error("content reply is not valid JSON: {0}")]
    Parse(String),
}

pub fn disease_prompt(disease_name: &str) -> String {
    format!(
        r#"For the disease "{disease_name}", provide the following information in JSON format:
  {{
    "description": "A brief description of the disease",
    "precautions": ["List of precautions as an array"],
    "medications": ["List of common medications as an array"],
    "workouts": ["List of recommended exercises as an array"],
    "diets": ["List of dietary recommendations as an array"],
    "aiInsights": {{
      "severity": "Mild/Moderate/Severe",
      "recommendedActions": ["List of immediate actions to take"],
      "lifestyleChanges": ["List of recommended lifestyle changes"],
      "warningSigns": ["List of warning signs to watch for"],
      "followUpRecommendations": ["List of follow-up recommendations"]
    }}
  }}"#
    )
}

pub fn fallback_insights() -> AiInsights {
    AiInsights {
        severity: "Unknown".to_string(),
        recommended_actions: vec!["Seek medical consultation".to_string()],
        lifestyle_changes: vec!["Maintain healthy lifestyle".to_string()],
        warning_signs: vec!["Monitor symptoms closely".to_string()],
        follow_up_recommendations: vec!["Regular medical check-ups".to_string()],
    }
}

pub fn fallback_content() -> DiseaseContent {
    DiseaseContent {
        description: FALLBACK_DESCRIPTION.to_string(),
        precautions: vec!["Consult with a healthcare professional".to_string()],
        medications: vec!["Consult with a doctor for proper medication".to_string()],
        workouts: vec!["Light exercise as recommended by doctor".to_string()],
        diets: vec!["Balanced diet as recommended by nutritionist".to_string()],
        ai_insights: Some(fallback_insights()),
    }
}

/// Models like to wrap JSON in markdown fences or chat around it; keep only
/// the outermost object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_disease_content(text: &str) -> Result<DiseaseContent, ContentError> {
    let json = extract_json_object(text)
        .ok_or_else(|| ContentError::Parse("no JSON object in reply".to_string()))?;
    let parsed: DiseaseContent =
        serde_json::from_str(json).map_err(|e| ContentError::Parse(e.to_string()))?;
    Ok(fill_gaps(parsed))
}

/// Replaces empty fields with their fallback so every list the client
/// renders has at least one item.
pub fn fill_gaps(content: DiseaseContent) -> DiseaseContent {
    let fallback = fallback_content();
    let description = content.description.trim().to_string();

    DiseaseContent {
        description: if description.is_empty() {
            fallback.description
        } else {
            description
        },
        precautions: non_empty_or(content.precautions, fallback.precautions),
        medications: non_empty_or(content.medications, fallback.medications),
        workouts: non_empty_or(content.workouts, fallback.workouts),
        diets: non_empty_or(content.diets, fallback.diets),
        ai_insights: content.ai_insights.map(fill_insight_gaps).or(fallback.ai_insights),
    }
}

fn fill_insight_gaps(insights: AiInsights) -> AiInsights {
    let fallback = fallback_insights();
    let severity = insights.severity.trim().to_string();
    AiInsights {
        severity: if severity.is_empty() {
            fallback.severity
        } else {
            severity
        },
        recommended_actions: non_empty_or(
            insights.recommended_actions,
            fallback.recommended_actions,
        ),
        lifestyle_changes: non_empty_or(insights.lifestyle_changes, fallback.lifestyle_changes),
        warning_signs: non_empty_or(insights.warning_signs, fallback.warning_signs),
        follow_up_recommendations: non_empty_or(
            insights.follow_up_recommendations,
            fallback.follow_up_recommendations,
        ),
    }
}

fn non_empty_or(items: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        fallback
    } else {
        items
    }
}

pub async fn try_generate_disease_content(
    model: &dyn TextModel,
    disease_name: &str,
) -> Result<DiseaseContent, ContentError> {
    let reply = model
        .generate(&GenerateRequest::prompt(disease_prompt(disease_name)))
        .await?;
    parse_disease_content(&reply)
}

/// Never fails: a model or parse error degrades to the fallback content.
pub async fn generate_disease_content(model: &dyn TextModel, disease_name: &str) -> DiseaseContent {
    match try_generate_disease_content(model, disease_name).await {
        Ok(content) => content,
        Err(e) => {
            warn!(disease = %disease_name, error = %e, "disease content fell back to placeholder");
            fallback_content()
        }
    }
}
