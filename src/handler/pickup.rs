// handler/pickup.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::pickupdb::PickupExt,
    dtos::pickupdtos::{PickupListResponseDto, PickupResponseDto, SchedulePickupDto},
    error::HttpError,
    middleware::AuthUser,
    AppState,
};

pub fn pickup_handler() -> Router {
    Router::new()
        .route("/", get(get_my_pickups).post(schedule_pickup))
        .route("/:pickup_id", get(get_pickup))
}

pub fn facility_handler() -> Router {
    Router::new().route("/pickups", get(get_open_pickups))
}

pub async fn schedule_pickup(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SchedulePickupDto>,
) -> Result<impl IntoResponse, HttpError> {
    // field errors come back keyed by field, before anything is stored
    let pickup = app_state
        .pickup_service
        .schedule(user.id, &body, Utc::now().date_naive())
        .await
        .map_err(HttpError::from)?;

    Ok(Json(PickupResponseDto {
        status: "success".to_string(),
        data: pickup,
    }))
}

pub async fn get_my_pickups(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let pickups = app_state
        .db_client
        .get_user_pickups(user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(PickupListResponseDto {
        status: "success".to_string(),
        results: pickups.len(),
        pickups,
    }))
}

pub async fn get_pickup(
    Path(pickup_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let pickup = app_state
        .db_client
        .get_pickup(user.id, pickup_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Pickup request not found"))?;

    Ok(Json(PickupResponseDto {
        status: "success".to_string(),
        data: pickup,
    }))
}

#[derive(Debug, Deserialize)]
pub struct OpenPickupsQuery {
    pub limit: Option<i64>,
}

pub async fn get_open_pickups(
    Query(query): Query<OpenPickupsQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let pickups = app_state
        .db_client
        .get_open_pickups(limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(PickupListResponseDto {
        status: "success".to_string(),
        results: pickups.len(),
        pickups,
    }))
}
