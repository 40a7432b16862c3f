use chrono::DateTime;
use sqlx::SqlitePool;

use crate::models::prediction_api_models::SymptomEntry;
use crate::services::gemini_service::{ChatTurn, GenerateRequest, LlmError, TextModel};
use crate::services::symptom_history_service;

pub const RECENT_ENTRY_LIMIT: i64 = 5;

const MEDICAL_GUIDANCE: &str = r#"
Medical Disclaimer:
The information provided is for informational purposes only and is not a substitute for professional medical advice, diagnosis, or treatment. Always seek the advice of your physician or other qualified health provider with any questions you may have regarding a medical condition.

Tone Instructions:
- Be empathetic and acknowledge the user's concerns
- Use simple, non-technical language
- Include appropriate disclaimers
- Provide practical, actionable advice when appropriate
- Reference the user's symptom history when relevant
"#;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("failed to load symptom history: {0}")]
    History(#[from] sqlx::Error),
    #[error("chat model failed: {0}")]
    Model(#[from] LlmError),
}

#[derive(Debug)]
pub struct ChatReply {
    pub message: String,
    pub history: Vec<ChatTurn>,
}

fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.chars().take(10).collect())
}

/// System instruction carrying the user's recent symptom history.
pub fn build_medical_context(entries: &[SymptomEntry]) -> String {
    let mut context = String::from("Recent Symptom History:\n");

    if entries.is_empty() {
        context.push_str("No recent symptom history available.\n");
    }

    for entry in entries {
        // Entries keep their predictions ranked; the first is the headline.
        let top = entry.predictions.first();
        let list = |items: Option<&Vec<String>>| {
            items.map(|v| v.join(", ")).unwrap_or_default()
        };

        context.push_str(&format!(
            "\nDate: {}\nDisease: {}\nSymptoms: {}\nDescription: {}\nPrecautions: {}\nMedications: {}\nWorkouts: {}\nDiets: {}\n---\n",
            format_date(&entry.created_at),
            top.map(|p| p.disease_name.as_str()).unwrap_or("Unknown"),
            entry.symptoms.join(", "),
            top.map(|p| p.description.as_str()).unwrap_or(""),
            list(top.map(|p| &p.precautions)),
            list(top.map(|p| &p.medications)),
            list(top.map(|p| &p.workouts)),
            list(top.map(|p| &p.diets)),
        ));
    }

    context.push_str(MEDICAL_GUIDANCE);
    context
}

pub async fn reply(
    pool: &SqlitePool,
    model: &dyn TextModel,
    user_id: &str,
    message: &str,
    history: Vec<ChatTurn>,
) -> Result<ChatReply, ChatError> {
    let recent =
        symptom_history_service::list_symptom_history(pool, user_id, Some(RECENT_ENTRY_LIMIT))
            .await?;

    let mut turns = history;
    turns.push(ChatTurn::user(message));

    let request = GenerateRequest {
        system_instruction: Some(build_medical_context(&recent)),
        turns,
    };
    let text = model.generate(&request).await?;

    let mut history = request.turns;
    history.push(ChatTurn::model(text.clone()));
    Ok(ChatReply {
        message: text,
        history,
    })
}
