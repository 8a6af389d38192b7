// handler/classify.rs
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, response::IntoResponse, routing::post, Extension, Json, Router};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::classificationdb::ClassificationExt,
    dtos::classifydtos::{ClassifyWasteDto, EnhancedClassificationResult, EnhancedClassifyDto},
    error::HttpError,
    middleware::AuthUser,
    service::{classifier::EnhancedOptions, error::ServiceError, gamification::Activity},
    utils::image_utils::MAX_IMAGE_BODY_BYTES,
    AppState,
};

pub fn classify_handler() -> Router {
    Router::new()
        .route("/classify-waste", post(classify_waste))
        .route("/classify", post(classify_enhanced))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BODY_BYTES))
}

pub async fn classify_waste(
    Extension(app_state): Extension<Arc<AppState>>,
    user: Option<Extension<AuthUser>>,
    Json(body): Json<ClassifyWasteDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| HttpError::validation(&e))?;

    let result = app_state
        .classification_service
        .classify(&body.image, body.api_key.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("classification failed: {}", e);
            HttpError::from(e)
        })?;

    tracing::info!(category = %result.category, confidence = result.confidence, "classified image");

    match user {
        Some(Extension(user)) => {
            let db_client = app_state.db_client.clone();
            let record = result.clone();
            tokio::spawn(async move {
                match db_client.save_classification(user.id, &body.image, &record).await {
                    Ok(saved) => {
                        tracing::info!(user_id = %user.id, classification_id = %saved.id, "saved classification history");
                    }
                    Err(e) => {
                        tracing::warn!(user_id = %user.id, "failed to save classification history: {}", e);
                    }
                }
            });
        }
        None => tracing::debug!("anonymous classification, history not saved"),
    }

    Ok(Json(result))
}

pub async fn classify_enhanced(
    Extension(app_state): Extension<Arc<AppState>>,
    user: Option<Extension<AuthUser>>,
    Json(body): Json<EnhancedClassifyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| HttpError::validation(&e))?;

    let options = EnhancedOptions::from(&body);
    let result = app_state
        .classification_service
        .enhanced_classify(&body.image_url, &options)
        .await
        .map_err(|e| {
            tracing::error!("enhanced classification failed: {}", e);
            match e {
                ServiceError::MissingApiKey | ServiceError::Validation(_) | ServiceError::ImageDecode(_) => {
                    HttpError::from(e)
                }
                _ => HttpError::server_error("Failed to classify waste"),
            }
        })?;

    if let Some(Extension(user)) = user {
        tokio::spawn(record_enhanced(
            app_state.clone(),
            user.id,
            body.image_url,
            result.clone(),
        ));
    }

    Ok(Json(result))
}

/// History row first, then stats and badges. Every failure here is logged and
/// dropped; the caller already has its answer.
async fn record_enhanced(
    app_state: Arc<AppState>,
    user_id: Uuid,
    image_url: String,
    result: EnhancedClassificationResult,
) {
    if let Err(e) = app_state
        .db_client
        .save_enhanced_classification(user_id, &image_url, &result)
        .await
    {
        tracing::warn!(%user_id, "failed to save enhanced classification: {}", e);
        return;
    }

    let today = Utc::now().date_naive();
    match app_state
        .gamification_service
        .record_activity(user_id, Activity::from(&result), today)
        .await
    {
        Ok(outcome) => {
            tracing::info!(
                %user_id,
                total_points = outcome.stats.total_points,
                level = outcome.stats.level,
                streak = outcome.stats.current_streak,
                badges_awarded = outcome.badges_awarded.len(),
                "recorded classification activity"
            );
            for error in &outcome.badge_errors {
                tracing::warn!(%user_id, "badge not awarded: {}", error);
            }
        }
        Err(e) => {
            tracing::warn!(%user_id, "failed to update user stats: {}", e);
        }
    }
}
