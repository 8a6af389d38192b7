// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        chat::chat_handler,
        classify::classify_handler,
        gamification::gamification_handler,
        history::history_handler,
        pickup::{facility_handler, pickup_handler},
        settings::settings_handler,
    },
    middleware::{auth, optional_auth},
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .merge(classify_handler().layer(middleware::from_fn(optional_auth)))
        .nest("/chat", chat_handler())
        .nest("/settings", settings_handler())
        .nest(
            "/classifications",
            history_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/gamification",
            gamification_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/pickups",
            pickup_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/facilities",
            facility_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
