//! mindmood-rec library - emotion-aware content recommender
//!
//! Exposes the router, evidence sources and service for integration testing.

pub mod api;
pub mod error;
pub mod evidence;
pub mod service;

pub use crate::error::{ApiError, ApiResult};
pub use crate::service::{RecommendRequest, Recommender};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mindmood_common::config::ServerConfig;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog, ranking index and evidence sources
    pub recommender: Arc<Recommender>,
    /// Request body cap (audio uploads)
    pub max_upload_bytes: usize,
    /// Attach a permissive CORS layer
    pub cors_permissive: bool,
}

impl AppState {
    pub fn new(recommender: Recommender, server: &ServerConfig) -> Self {
        Self {
            recommender: Arc::new(recommender),
            max_upload_bytes: server.max_upload_bytes,
            cors_permissive: server.cors_permissive,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    let cors_permissive = state.cors_permissive;

    let router = Router::new()
        .merge(api::status_routes())
        .merge(api::vocabulary_routes())
        .merge(api::recommend_routes())
        .merge(api::analyze_routes())
        .with_state(state)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
