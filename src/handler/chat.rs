// handler/chat.rs
use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Extension, Json, Router};

use crate::{
    dtos::chatdtos::{ChatRequestDto, ChatResponseDto},
    error::{ErrorMessage, HttpError},
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new().route("/", post(chat))
}

pub async fn chat(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ChatRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    if body.message.trim().is_empty() {
        return Err(HttpError::bad_request("Message is required"));
    }

    if !app_state.chat_service.is_configured() {
        tracing::error!("GEMINI_API_KEY is not configured");
        return Err(HttpError::server_error(ErrorMessage::ChatbotNotConfigured.to_string()));
    }

    let response = app_state
        .chat_service
        .reply(&body.message, &body.history)
        .await
        .map_err(|e| {
            tracing::error!("chat request failed: {}", e);
            HttpError::server_error(format!("Failed to get response from assistant: {}", e))
        })?;

    Ok(Json(ChatResponseDto { response }))
}
