//! Shared HTTP API types
//!
//! Request/response shapes for the recommender service. This module contains
//! only plain serde types and their constructors; the service crate wraps
//! them with Axum handlers.

pub mod types;

pub use types::{
    AnalyzeTextRequest, Diagnostics, EmotionDetectionResponse, RecommendJsonRequest,
    RecommendResponse, RecommendationEntry,
};
