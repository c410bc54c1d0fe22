//! Single-modality analysis endpoints
//!
//! Expose each evidence source on its own, returning
//! `{emotion_scores, primary_emotion, confidence}` in canonical labels.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};

use mindmood_common::api::{AnalyzeTextRequest, EmotionDetectionResponse};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Accepted upload content types for `/analyze/voice`
pub const ACCEPTED_AUDIO_TYPES: &[&str] = &["audio/wav", "audio/x-wav", "audio/mpeg", "audio/ogg"];

/// POST /analyze/text
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeTextRequest>,
) -> ApiResult<Json<EmotionDetectionResponse>> {
    let response = state.recommender.analyze_text(&body.text).await?;
    Ok(Json(response))
}

/// POST /analyze/voice
///
/// Multipart with one `audio_file` field.
pub async fn analyze_voice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<EmotionDetectionResponse>> {
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("audio_file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !ACCEPTED_AUDIO_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::UnsupportedMedia(format!(
                "'{}' (expected one of {})",
                content_type,
                ACCEPTED_AUDIO_TYPES.join(", ")
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Read audio failed: {}", e)))?;
        audio = Some(bytes.to_vec());
    }

    let audio =
        audio.ok_or_else(|| ApiError::BadRequest("Missing 'audio_file' field".to_string()))?;

    let response = state.recommender.analyze_audio(&audio).await?;
    Ok(Json(response))
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze/text", post(analyze_text))
        .route("/analyze/voice", post(analyze_voice))
}
