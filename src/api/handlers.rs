//! API request handlers

use serde_json::Value;
use tracing::info;

use super::models::{ApiError, DigestPayload, SearchPayload};
use super::server::AppState;
use crate::error::DigestError;
use crate::pipeline::{EnrichedResult, SearchRequest, VideoDigest};
use crate::search::{DurationTier, Language};

/// Handle health check requests
pub async fn health_check() -> Value {
    serde_json::json!({
        "status": "ok",
        "service": "video-tldr",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

fn language_of(raw: Option<String>) -> Language {
    raw.filter(|code| !code.trim().is_empty())
        .map(|code| Language::new(code.trim()))
        .unwrap_or_default()
}

/// Handle search requests: discover, scrape and summarize
pub async fn search_videos(state: &AppState, payload: SearchPayload) -> Result<Vec<EnrichedResult>, ApiError> {
    let query = payload.search_term.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Please enter a search term".to_string()));
    }

    let tier: DurationTier = payload
        .video_duration
        .parse()
        .map_err(|e: crate::error::DiscoveryError| ApiError::BadRequest(e.to_string()))?;

    let request = SearchRequest {
        query: query.to_string(),
        tier,
        language: language_of(payload.language),
    };

    // One browser session at a time
    let _guard = state.session_gate.lock().await;
    info!("📥 Search request: {:?} ({})", request.query, request.tier);

    state
        .pipeline
        .run(&request)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Handle single-video digest requests
pub async fn digest_video(state: &AppState, payload: DigestPayload) -> Result<VideoDigest, ApiError> {
    let language = language_of(payload.language);

    let _guard = state.session_gate.lock().await;
    info!("📥 Digest request: {}", payload.url);

    state
        .pipeline
        .digest(&payload.url, &language)
        .await
        .map_err(|e| match e {
            DigestError::UnsupportedUrl(_) => ApiError::BadRequest(e.to_string()),
        })
}
