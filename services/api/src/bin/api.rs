//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, llm::OpenAiTextAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the AI Adapter ---
    let mut ai_config = OpenAIConfig::new().with_api_key(
        config
            .ai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("AI_API_KEY is required".to_string()))?,
    );
    if let Some(api_base) = &config.ai_api_base {
        info!("Using AI endpoint {}", api_base);
        ai_config = ai_config.with_api_base(api_base);
    }
    let llm = Arc::new(OpenAiTextAdapter::new(
        Client::with_config(ai_config),
        config.ai_model.clone(),
        config.ai_timeout,
    ));

    // --- 4. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        llm,
    });
    let app = build_router(app_state);

    // --- 5. Start the Server ---
    info!("🚀 Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
