use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::services::chat_assistant_service;
use crate::services::gemini_service::ChatTurn;
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    message: String,
    history: Vec<ChatTurn>,
}

pub async fn chat_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }

    match chat_assistant_service::reply(
        &state.pool,
        state.text_model.as_ref(),
        &auth_user.id,
        message,
        body.history,
    )
    .await
    {
        Ok(reply) => Ok(Json(ChatResponse {
            message: reply.message,
            history: reply.history,
        })),
        Err(e) => {
            warn!("💬 Chat failed for {}: {}", auth_user.id, e);
            Err(ApiError::internal("Failed to process chat message"))
        }
    }
}
