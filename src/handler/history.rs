// handler/history.rs
use std::sync::Arc;

use axum::{extract::Query, response::IntoResponse, routing::get, Extension, Json, Router};
use validator::Validate;

use crate::{
    db::classificationdb::ClassificationExt,
    dtos::classifydtos::{ClassificationHistoryDto, HistoryQueryDto},
    error::HttpError,
    middleware::AuthUser,
    AppState,
};

pub const DEFAULT_HISTORY_LIMIT: i64 = 5;

pub fn history_handler() -> Router {
    Router::new().route("/", get(get_classifications))
}

pub async fn get_classifications(
    Query(params): Query<HistoryQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| HttpError::validation(&e))?;

    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let classifications = app_state
        .db_client
        .get_user_classifications(user.id, limit)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, "failed to load classification history: {}", e);
            HttpError::server_error(e.to_string())
        })?;

    Ok(Json(ClassificationHistoryDto {
        status: "success".to_string(),
        results: classifications.len(),
        classifications,
    }))
}
