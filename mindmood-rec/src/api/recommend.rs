//! Recommendation endpoints
//!
//! - `POST /recommend`: multipart form (`text`, `audio`, `alpha_audio`, `top_k`)
//! - `POST /api/recommend`: JSON body, text only

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::debug;

use mindmood_common::api::{RecommendJsonRequest, RecommendResponse};

use crate::error::{ApiError, ApiResult};
use crate::service::RecommendRequest;
use crate::AppState;

/// POST /recommend
///
/// Every field is optional. Unknown fields are ignored.
pub async fn recommend_form(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<RecommendResponse>> {
    let mut request = RecommendRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => {
                request.text = Some(read_text(field, &name).await?);
            }
            "audio" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read audio failed: {}", e)))?;
                request.audio = Some(bytes.to_vec());
            }
            "alpha_audio" => {
                request.alpha_audio = parse_optional(&read_text(field, &name).await?, &name)?;
            }
            "top_k" => {
                request.top_k = parse_optional(&read_text(field, &name).await?, &name)?;
            }
            other => {
                debug!(field = other, "Ignoring unknown form field");
            }
        }
    }

    let response = state.recommender.recommend(request).await?;
    Ok(Json(response))
}

/// POST /api/recommend
pub async fn recommend_json(
    State(state): State<AppState>,
    Json(body): Json<RecommendJsonRequest>,
) -> ApiResult<Json<RecommendResponse>> {
    let request = RecommendRequest {
        text: body.text,
        audio: None,
        alpha_audio: body.alpha_audio,
        top_k: body.top_k,
    };

    let response = state.recommender.recommend(request).await?;
    Ok(Json(response))
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Read field '{}' failed: {}", name, e)))
}

/// Blank values fall back to the configured default
fn parse_optional<T: std::str::FromStr>(value: &str, name: &str) -> ApiResult<Option<T>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("Field '{}' has invalid value '{}'", name, value)))
}

pub fn recommend_routes() -> Router<AppState> {
    Router::new()
        .route("/recommend", post(recommend_form))
        .route("/api/recommend", post(recommend_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<f64>("0.25", "alpha_audio").unwrap(), Some(0.25));
        assert_eq!(parse_optional::<usize>("  ", "top_k").unwrap(), None);
        assert!(parse_optional::<usize>("-3", "top_k").is_err());
        assert!(parse_optional::<f64>("lots", "alpha_audio").is_err());
    }
}
