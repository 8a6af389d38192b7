// handler/settings.rs
use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::post, Extension, Json, Router};

use crate::{
    dtos::classifydtos::{ApiKeyCheckDto, ApiKeyCheckResponseDto},
    service::error::ServiceError,
    AppState,
};

pub fn settings_handler() -> Router {
    Router::new().route("/check-gemini", post(check_gemini))
}

/// Always answers `{ok, message}`; a failed check is a 500 with `ok: false`.
pub async fn check_gemini(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Option<Json<ApiKeyCheckDto>>,
) -> impl IntoResponse {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    match app_state
        .classification_service
        .check_api_key(body.api_key.as_deref())
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiKeyCheckResponseDto {
                ok: true,
                message: "Gemini is reachable and the API key looks valid.".to_string(),
            }),
        ),
        Err(ServiceError::MissingApiKey) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiKeyCheckResponseDto {
                ok: false,
                message: "GEMINI_API_KEY not set (or GOOGLE_GEMINI_API_KEY).".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!("gemini key check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiKeyCheckResponseDto {
                    ok: false,
                    message: format!("Gemini check failed: {}", e),
                }),
            )
        }
    }
}
