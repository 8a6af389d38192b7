mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use db::{gamificationdb::GamificationExt, DBClient};
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

use service::{
    chat::ChatService,
    classifier::ClassificationService,
    gamification::GamificationService,
    gemini::{GeminiClient, GenerativeModel},
    pickup::PickupService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    // Services
    pub classification_service: Arc<ClassificationService>,
    pub gamification_service: Arc<GamificationService>,
    pub pickup_service: Arc<PickupService>,
    pub chat_service: Arc<ChatService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(&config));
        Self::with_model(db_client, config, model)
    }

    pub fn with_model(db_client: DBClient, config: Config, model: Arc<dyn GenerativeModel>) -> Self {
        let db_client_arc = Arc::new(db_client);
        let store: Arc<dyn GamificationExt> = db_client_arc.clone();

        let classification_service = Arc::new(ClassificationService::new(model.clone(), config.clone()));
        let gamification_service = Arc::new(GamificationService::new(store));
        let pickup_service = Arc::new(PickupService::new(db_client_arc.clone()));
        let chat_service = Arc::new(ChatService::new(model, config.clone()));

        Self {
            env: config,
            db_client: db_client_arc,
            classification_service,
            gamification_service,
            pickup_service,
            chat_service,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ecosort=debug,tower_http=debug")),
        )
        .init();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅Connection to the database is successful!");
            pool
        }
        Err(err) => {
            tracing::error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; classification needs a per-request key and chat is disabled");
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "skipping invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST]);

    let app_state = AppState::new(DBClient::new(pool), config.clone());
    let app = create_router(Arc::new(app_state)).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("🔥 Failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server stopped: {}", err);
    }
}
