//! HTTP clients for external model servers
//!
//! Model servers expose the classifier output as
//! `{"emotion_scores": {"<label>": <probability>, ...}}` (a bare label map
//! is accepted too). Labels are in the model's own vocabulary and are
//! projected through the configured [`LabelRemapTable`].
//!
//! - Text: `POST <url>` with `{"text": "..."}`
//! - Audio: `POST <url>` as `multipart/form-data` with the recording in an
//!   `audio_file` part (`audio/wav`), the same shape `/analyze/voice` accepts
//!
//! Text output that maps to nothing falls back to `Neutral` in the service.
//! Audio output that maps to nothing is reported as an unavailable source.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use mindmood_common::{EmotionVector, Error, LabelRemapTable, Result};

use super::{AudioEvidenceSource, TextEvidenceSource};

const USER_AGENT: &str = concat!("mindmood-rec/", env!("CARGO_PKG_VERSION"));

/// Multipart field carrying the recording
const AUDIO_FIELD: &str = "audio_file";
const AUDIO_FILE_NAME: &str = "recording.wav";
const AUDIO_MIME: &str = "audio/wav";

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoresResponse {
    Wrapped { emotion_scores: HashMap<String, f64> },
    Bare(HashMap<String, f64>),
}

impl ScoresResponse {
    fn into_scores(self) -> HashMap<String, f64> {
        match self {
            ScoresResponse::Wrapped { emotion_scores } => emotion_scores,
            ScoresResponse::Bare(scores) => scores,
        }
    }
}

/// Shared HTTP plumbing for one model endpoint
#[derive(Debug, Clone)]
struct ScoresEndpoint {
    http_client: reqwest::Client,
    url: String,
}

impl ScoresEndpoint {
    fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client for {} failed: {}", url, e)))?;

        Ok(Self {
            http_client,
            url: url.to_string(),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HashMap<String, f64>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::EvidenceSourceUnavailable(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::EvidenceSourceUnavailable(format!(
                "{} returned {}: {}",
                self.url,
                status.as_u16(),
                error_text
            )));
        }

        let parsed: ScoresResponse = response.json().await.map_err(|e| {
            Error::EvidenceSourceUnavailable(format!("{} sent unreadable scores: {}", self.url, e))
        })?;

        let scores = parsed.into_scores();
        debug!(url = %self.url, labels = scores.len(), "Received model scores");
        Ok(scores)
    }
}

/// Text model behind an HTTP endpoint
#[derive(Debug, Clone)]
pub struct RemoteTextClassifier {
    endpoint: ScoresEndpoint,
    table: LabelRemapTable,
}

impl RemoteTextClassifier {
    pub fn new(url: &str, table: LabelRemapTable, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: ScoresEndpoint::new(url, timeout)?,
            table,
        })
    }
}

#[async_trait]
impl TextEvidenceSource for RemoteTextClassifier {
    fn name(&self) -> &str {
        "remote-text"
    }

    fn label_table(&self) -> &LabelRemapTable {
        &self.table
    }

    async fn predict(&self, text: &str) -> Result<HashMap<String, f64>> {
        let request = self
            .endpoint
            .http_client
            .post(&self.endpoint.url)
            .json(&json!({ "text": text }));
        self.endpoint.send(request).await
    }
}

/// Audio model behind an HTTP endpoint
#[derive(Debug, Clone)]
pub struct RemoteAudioClassifier {
    endpoint: ScoresEndpoint,
    table: LabelRemapTable,
}

impl RemoteAudioClassifier {
    pub fn new(url: &str, table: LabelRemapTable, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: ScoresEndpoint::new(url, timeout)?,
            table,
        })
    }
}

#[async_trait]
impl AudioEvidenceSource for RemoteAudioClassifier {
    fn name(&self) -> &str {
        "remote-audio"
    }

    async fn predict(&self, audio: &[u8]) -> Result<EmotionVector> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(AUDIO_FILE_NAME)
            .mime_str(AUDIO_MIME)
            .map_err(|e| {
                Error::EvidenceSourceUnavailable(format!("{}: {}", self.endpoint.url, e))
            })?;
        let form = reqwest::multipart::Form::new().part(AUDIO_FIELD, part);

        let request = self
            .endpoint
            .http_client
            .post(&self.endpoint.url)
            .multipart(form);
        let scores = self.endpoint.send(request).await?;

        self.table.try_remap(&scores).ok_or_else(|| {
            Error::EvidenceSourceUnavailable(format!(
                "{} returned no recognised emotion labels",
                self.endpoint.url
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use mindmood_common::EmotionClass;
    use serde_json::Value;

    /// Serve `router` on an ephemeral local port and return its base URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Model server that only answers uploads shaped like `/analyze/voice` expects
    async fn voice_model(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
        while let Ok(Some(field)) = multipart.next_field().await {
            let is_audio_file = field.name() == Some("audio_file")
                && field.content_type() == Some("audio/wav")
                && field.file_name().is_some();
            let data = field.bytes().await.unwrap_or_default();
            if is_audio_file && data.as_ref() == b"RIFF....WAVE" {
                return (
                    StatusCode::OK,
                    Json(json!({"emotion_scores": {"angry": 0.6, "neutral": 0.2, "sleepy": 0.2}})),
                );
            }
        }
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "audio_file is required"})),
        )
    }

    fn audio_client(url: String) -> RemoteAudioClassifier {
        RemoteAudioClassifier::new(&url, LabelRemapTable::canonical(), Duration::from_secs(2))
            .unwrap()
    }

    #[test]
    fn test_scores_response_shapes() {
        let wrapped: ScoresResponse =
            serde_json::from_str(r#"{"emotion_scores": {"joy": 0.9, "anger": 0.1}}"#).unwrap();
        assert_eq!(wrapped.into_scores()["joy"], 0.9);

        let bare: ScoresResponse = serde_json::from_str(r#"{"sadness": 1.0}"#).unwrap();
        assert_eq!(bare.into_scores()["sadness"], 1.0);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Port 9 (discard) on localhost is almost never listening
        let classifier = RemoteTextClassifier::new(
            "http://127.0.0.1:9/analyze/text",
            LabelRemapTable::distilroberta(),
            Duration::from_secs(2),
        )
        .unwrap();

        let result = classifier.predict("hello").await;
        assert!(matches!(result, Err(Error::EvidenceSourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_audio_uploaded_as_audio_file_part() {
        let base = serve(Router::new().route("/voice", post(voice_model))).await;
        let classifier = audio_client(format!("{}/voice", base));

        let vector = classifier.predict(b"RIFF....WAVE").await.unwrap();
        assert!((vector.probability(EmotionClass::Angry) - 0.6).abs() < 1e-12);
        assert!((vector.probability(EmotionClass::Sleepy) - 0.2).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_audio_unmappable_labels_are_unavailable() {
        let router = Router::new().route(
            "/voice",
            post(|| async { Json(json!({"emotion_scores": {"happy": 0.9, "sad": 0.1}})) }),
        );
        let classifier = audio_client(format!("{}/voice", serve(router).await));

        let result = classifier.predict(b"RIFF").await;
        match result {
            Err(Error::EvidenceSourceUnavailable(reason)) => {
                assert!(reason.contains("no recognised emotion labels"));
            }
            other => panic!("expected unavailable source, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_audio_error_status_is_unavailable() {
        let router = Router::new().route(
            "/voice",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let classifier = audio_client(format!("{}/voice", serve(router).await));

        match classifier.predict(b"RIFF").await {
            Err(Error::EvidenceSourceUnavailable(reason)) => {
                assert!(reason.contains("500"));
                assert!(reason.contains("model not loaded"));
            }
            other => panic!("expected unavailable source, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bare_score_maps_accepted() {
        let router = Router::new()
            .route("/voice", post(|| async { Json(json!({"sleepy": 1.0})) }))
            .route(
                "/text",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["text"], "so tired");
                    Json(json!({"sadness": 0.7, "joy": 0.3}))
                }),
            );
        let base = serve(router).await;

        let audio = audio_client(format!("{}/voice", base));
        assert_eq!(
            audio.predict(b"RIFF").await.unwrap(),
            EmotionVector::one_hot(EmotionClass::Sleepy)
        );

        let text = RemoteTextClassifier::new(
            &format!("{}/text", base),
            LabelRemapTable::distilroberta(),
            Duration::from_secs(2),
        )
        .unwrap();
        let scores = text.predict("so tired").await.unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["sadness"], 0.7);
    }
}
