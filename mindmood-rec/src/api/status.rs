//! Liveness and build identification
//!
//! `/health` also reports what the service is running with (catalog size and
//! which evidence sources were wired at startup), so a deployment with no
//! audio model is visible without sending a recording.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

const MODULE_NAME: &str = "mindmood-rec";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub catalog_items: usize,
    /// Configured source names; `null` when the modality is unavailable
    pub text_source: Option<String>,
    pub audio_source: Option<String>,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let recommender = &state.recommender;
    let sources = recommender.sources();

    Json(HealthResponse {
        status: "ok",
        module: MODULE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        catalog_items: recommender.catalog().len(),
        text_source: sources.text_name().map(str::to_string),
        audio_source: sources.audio_name().map(str::to_string),
    })
}

/// Values stamped in by build.rs
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
            build_profile: env!("BUILD_PROFILE"),
        }
    }
}

/// GET /api/buildinfo
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/buildinfo", get(build_info))
}
