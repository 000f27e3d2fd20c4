//! Polem API - REST server
//!
//! Exposes the lemmatization pipeline over HTTP:
//! - `POST /api/v1/lemmatize` enriches a label batch
//! - `GET /health` reports liveness and the active engine
//! - `/swagger-ui` and `/api-docs/openapi.json` document the API

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use polem_core::config::AppConfig;
use polem_pipeline::DictionaryEngine;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(title = "Polem API", description = "Named-entity lemmatization over positional labels"),
    paths(
        handlers::health::health_check,
        handlers::lemmatize::lemmatize_handler,
    ),
    components(schemas(error::ApiError, handlers::health::HealthResponse)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "lemmatize", description = "Label batch lemmatization")
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router over default configuration and an empty dictionary engine
pub fn create_router_for_testing() -> Router {
    let state = AppState::new(AppConfig::default(), Box::new(DictionaryEngine::new()));
    create_router(Arc::new(state))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(AppState::from_config(config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Polem API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
