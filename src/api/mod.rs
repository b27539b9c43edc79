//! API module for the video TLDR service
//!
//! Provides the REST endpoints used by the web front-end.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::pipeline::Pipeline;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, AppState};

/// API Server for handling REST requests
pub struct ApiServer {
    pipeline: Arc<Pipeline>,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(pipeline: Arc<Pipeline>, port: u16) -> Self {
        Self { pipeline, port }
    }

    /// Start the API server and serve until it fails
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.port);
        server::start_http_server(self.pipeline, self.port).await
    }
}
