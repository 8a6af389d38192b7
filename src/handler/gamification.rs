// handler/gamification.rs
use std::sync::Arc;

use axum::{
    extract::Query,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;

use crate::{
    db::gamificationdb::GamificationExt,
    dtos::gamificationdtos::{GamificationAction, GamificationQueryDto},
    error::{ErrorMessage, HttpError},
    middleware::AuthUser,
    service::gamification::{impact_summary, period_start},
    AppState,
};

pub fn gamification_handler() -> Router {
    Router::new()
        .route("/", get(get_gamification))
        .route("/impact", get(get_impact))
}

pub async fn get_gamification(
    Query(query): Query<GamificationQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, HttpError> {
    let action = query
        .action
        .as_deref()
        .and_then(GamificationAction::parse)
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::InvalidAction.to_string()))?;

    let db_client = &app_state.db_client;
    let server_error = |e: sqlx::Error| {
        tracing::error!(user_id = %user.id, ?action, "gamification query failed: {}", e);
        HttpError::server_error("Internal server error")
    };

    let response = match action {
        GamificationAction::Stats => {
            let stats = app_state
                .gamification_service
                .stats_or_default(user.id)
                .await
                .map_err(HttpError::from)?;
            Json(stats).into_response()
        }
        GamificationAction::Badges => {
            let badges = db_client.get_user_badges(user.id).await.map_err(server_error)?;
            Json(badges).into_response()
        }
        GamificationAction::Leaderboard => {
            let period = query.leaderboard_period();
            let since = period_start(period, Utc::now());
            let leaderboard = db_client
                .get_leaderboard(period, since, query.leaderboard_limit())
                .await
                .map_err(server_error)?;
            Json(leaderboard).into_response()
        }
        GamificationAction::AllBadges => {
            let badges = db_client.get_all_badges().await.map_err(server_error)?;
            Json(badges).into_response()
        }
        GamificationAction::Challenges => {
            let challenges = db_client
                .get_active_challenges(Utc::now())
                .await
                .map_err(server_error)?;
            Json(challenges).into_response()
        }
        GamificationAction::ChallengeProgress => {
            let progress = db_client
                .get_user_challenge_progress(user.id)
                .await
                .map_err(server_error)?;
            Json(progress).into_response()
        }
    };

    Ok(response)
}

pub async fn get_impact(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state
        .gamification_service
        .stats_or_default(user.id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(impact_summary(&stats)))
}
