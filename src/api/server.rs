//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use super::models::{ApiError, DigestPayload, SearchPayload};
use crate::pipeline::{EnrichedResult, Pipeline, VideoDigest};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Serializes pipeline runs so only one browser session is live
    pub session_gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            session_gate: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the application router
pub fn router(app_state: AppState) -> Router {
    // Configure CORS to allow browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/digest", post(digest_handler))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(pipeline: Arc<Pipeline>, port: u16) -> Result<()> {
    let app = router(AppState::new(pipeline));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(handlers::health_check().await)
}

/// Search handler
async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchPayload>, JsonRejection>,
) -> Result<Json<Vec<EnrichedResult>>, ApiError> {
    let Json(payload) = payload?;
    handlers::search_videos(&state, payload).await.map(Json)
}

/// Digest handler
async fn digest_handler(
    State(state): State<AppState>,
    payload: Result<Json<DigestPayload>, JsonRejection>,
) -> Result<Json<VideoDigest>, ApiError> {
    let Json(payload) = payload?;
    handlers::digest_video(&state, payload).await.map(Json)
}
