//! Evidence sources
//!
//! An evidence source turns one input modality into an emotion estimate.
//! Sources are trait objects chosen at startup from configuration; the
//! service never knows which model sits behind them.
//!
//! Any failure (error, timeout, missing source) degrades to
//! [`EvidenceResult::Unavailable`] with a message for diagnostics.
//! Failures never reach the caller as errors.

pub mod keyword;
pub mod remote;

pub use keyword::KeywordTextClassifier;
pub use remote::{RemoteAudioClassifier, RemoteTextClassifier};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use mindmood_common::config::{EvidenceConfig, TextClassifierKind};
use mindmood_common::{EmotionVector, EvidenceResult, LabelRemapTable, Result};

/// Emotion classifier for recorded audio
#[async_trait]
pub trait AudioEvidenceSource: Send + Sync {
    /// Source name for logs and diagnostics
    fn name(&self) -> &str;

    /// Classify a recording into a canonical emotion distribution
    async fn predict(&self, audio: &[u8]) -> Result<EmotionVector>;
}

/// Emotion classifier for free text
///
/// Text models report in their own label space; the service projects the
/// output through [`TextEvidenceSource::label_table`] and keeps the raw
/// scores for diagnostics.
#[async_trait]
pub trait TextEvidenceSource: Send + Sync {
    /// Source name for logs and diagnostics
    fn name(&self) -> &str;

    /// Table mapping this classifier's labels onto the canonical vocabulary
    fn label_table(&self) -> &LabelRemapTable;

    /// Classify text into label → probability in the classifier's own labels
    async fn predict(&self, text: &str) -> Result<HashMap<String, f64>>;
}

/// Outcome of consulting one source for one request
#[derive(Debug, Clone, PartialEq)]
pub struct GatheredEvidence {
    pub result: EvidenceResult,
    /// Classifier output before remapping (text only)
    pub raw: Option<HashMap<String, f64>>,
    /// Why the source is unavailable, if it was asked and failed
    pub error: Option<String>,
}

impl GatheredEvidence {
    fn available(vector: EmotionVector, raw: Option<HashMap<String, f64>>) -> Self {
        Self {
            result: EvidenceResult::Available(vector),
            raw,
            error: None,
        }
    }

    /// Input absent: unavailable without an error
    fn absent() -> Self {
        Self {
            result: EvidenceResult::Unavailable,
            raw: None,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            result: EvidenceResult::Unavailable,
            raw: None,
            error: Some(error),
        }
    }
}

/// Configured audio and text sources with a shared per-source deadline
#[derive(Clone)]
pub struct EvidenceSources {
    audio: Option<Arc<dyn AudioEvidenceSource>>,
    text: Option<Arc<dyn TextEvidenceSource>>,
    timeout: Duration,
}

impl EvidenceSources {
    /// No sources; every modality is unavailable
    pub fn new(timeout: Duration) -> Self {
        Self {
            audio: None,
            text: None,
            timeout,
        }
    }

    pub fn with_audio(mut self, source: Arc<dyn AudioEvidenceSource>) -> Self {
        self.audio = Some(source);
        self
    }

    pub fn with_text(mut self, source: Arc<dyn TextEvidenceSource>) -> Self {
        self.text = Some(source);
        self
    }

    /// Construct sources from the `[evidence]` config section
    pub fn from_config(config: &EvidenceConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let mut sources = Self::new(timeout);

        sources = match config.text_classifier {
            TextClassifierKind::Keyword => sources.with_text(Arc::new(KeywordTextClassifier::new())),
            TextClassifierKind::Remote => {
                let url = config.text_url.as_deref().ok_or_else(|| {
                    mindmood_common::Error::Config(
                        "evidence.text_url is required for the remote text classifier".to_string(),
                    )
                })?;
                sources.with_text(Arc::new(RemoteTextClassifier::new(
                    url,
                    config.text_table()?,
                    timeout,
                )?))
            }
            TextClassifierKind::None => sources,
        };

        if let Some(url) = config.audio_url.as_deref() {
            sources = sources.with_audio(Arc::new(RemoteAudioClassifier::new(
                url,
                config.audio_table()?,
                timeout,
            )?));
        }

        Ok(sources)
    }

    pub fn audio_name(&self) -> Option<&str> {
        self.audio.as_deref().map(|source| source.name())
    }

    pub fn text_name(&self) -> Option<&str> {
        self.text.as_deref().map(|source| source.name())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Consult the audio source, if audio was supplied
    pub async fn gather_audio(&self, audio: Option<&[u8]>) -> GatheredEvidence {
        let Some(audio) = audio else {
            return GatheredEvidence::absent();
        };
        let Some(source) = self.audio.as_deref() else {
            debug!("Audio supplied but no audio source is configured");
            return GatheredEvidence::failed("no audio evidence source configured".to_string());
        };

        match tokio::time::timeout(self.timeout, source.predict(audio)).await {
            Ok(Ok(vector)) => GatheredEvidence::available(vector, None),
            Ok(Err(e)) => {
                warn!(source = source.name(), error = %e, "Audio evidence failed");
                GatheredEvidence::failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    source = source.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Audio evidence timed out"
                );
                GatheredEvidence::failed(format!(
                    "audio source timed out after {} ms",
                    self.timeout.as_millis()
                ))
            }
        }
    }

    /// Consult the text source, if text was supplied
    pub async fn gather_text(&self, text: Option<&str>) -> GatheredEvidence {
        let Some(text) = text else {
            return GatheredEvidence::absent();
        };
        let Some(source) = self.text.as_deref() else {
            debug!("Text supplied but no text source is configured");
            return GatheredEvidence::failed("no text evidence source configured".to_string());
        };

        match tokio::time::timeout(self.timeout, source.predict(text)).await {
            Ok(Ok(raw)) => {
                let vector = source.label_table().remap(&raw);
                GatheredEvidence::available(vector, Some(raw))
            }
            Ok(Err(e)) => {
                warn!(source = source.name(), error = %e, "Text evidence failed");
                GatheredEvidence::failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    source = source.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Text evidence timed out"
                );
                GatheredEvidence::failed(format!(
                    "text source timed out after {} ms",
                    self.timeout.as_millis()
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmood_common::{EmotionClass, Error};

    struct FixedAudio(EmotionVector);

    #[async_trait]
    impl AudioEvidenceSource for FixedAudio {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn predict(&self, _audio: &[u8]) -> Result<EmotionVector> {
            Ok(self.0)
        }
    }

    struct SlowText;

    #[async_trait]
    impl TextEvidenceSource for SlowText {
        fn name(&self) -> &str {
            "slow"
        }

        fn label_table(&self) -> &LabelRemapTable {
            unreachable!("never completes")
        }

        async fn predict(&self, _text: &str) -> Result<HashMap<String, f64>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(HashMap::new())
        }
    }

    struct BrokenAudio;

    #[async_trait]
    impl AudioEvidenceSource for BrokenAudio {
        fn name(&self) -> &str {
            "broken"
        }

        async fn predict(&self, _audio: &[u8]) -> Result<EmotionVector> {
            Err(Error::EvidenceSourceUnavailable("model crashed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_absent_input_has_no_error() {
        let sources = EvidenceSources::new(Duration::from_secs(1));
        assert_eq!(sources.gather_audio(None).await, GatheredEvidence::absent());
        assert_eq!(sources.gather_text(None).await, GatheredEvidence::absent());
    }

    #[tokio::test]
    async fn test_missing_source_is_unavailable() {
        let sources = EvidenceSources::new(Duration::from_secs(1));
        let gathered = sources.gather_audio(Some(&b"RIFF"[..])).await;
        assert_eq!(gathered.result, EvidenceResult::Unavailable);
        assert!(gathered.error.is_some());
    }

    #[tokio::test]
    async fn test_available_audio() {
        let vector = EmotionVector::one_hot(EmotionClass::Disgusted);
        let sources =
            EvidenceSources::new(Duration::from_secs(1)).with_audio(Arc::new(FixedAudio(vector)));

        let gathered = sources.gather_audio(Some(&b"RIFF"[..])).await;
        assert_eq!(gathered.result, EvidenceResult::Available(vector));
        assert!(gathered.error.is_none());
    }

    #[tokio::test]
    async fn test_failing_source_degrades() {
        let sources =
            EvidenceSources::new(Duration::from_secs(1)).with_audio(Arc::new(BrokenAudio));

        let gathered = sources.gather_audio(Some(&b"RIFF"[..])).await;
        assert_eq!(gathered.result, EvidenceResult::Unavailable);
        assert!(gathered.error.unwrap().contains("model crashed"));
    }

    #[tokio::test]
    async fn test_timeout_degrades() {
        let sources =
            EvidenceSources::new(Duration::from_millis(50)).with_text(Arc::new(SlowText));

        let gathered = sources.gather_text(Some("hello")).await;
        assert_eq!(gathered.result, EvidenceResult::Unavailable);
        assert!(gathered.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_text_is_remapped_and_raw_kept() {
        let sources = EvidenceSources::new(Duration::from_secs(1))
            .with_text(Arc::new(KeywordTextClassifier::new()));

        let gathered = sources.gather_text(Some("so happy and excited")).await;
        let vector = gathered.result.vector().copied().unwrap();
        assert_eq!(vector.argmax(), EmotionClass::Amused);
        assert_eq!(gathered.raw.unwrap().len(), 5);
    }

    #[test]
    fn test_from_config_default_is_keyword_text_only() {
        let sources = EvidenceSources::from_config(&EvidenceConfig::default()).unwrap();
        assert_eq!(sources.text_name(), Some("keyword"));
        assert_eq!(sources.audio_name(), None);
        assert_eq!(sources.timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_from_config_remote_sources() {
        let config = EvidenceConfig {
            text_classifier: TextClassifierKind::Remote,
            text_url: Some("http://127.0.0.1:8000/analyze/text".to_string()),
            audio_url: Some("http://127.0.0.1:8000/analyze/voice".to_string()),
            ..EvidenceConfig::default()
        };

        let sources = EvidenceSources::from_config(&config).unwrap();
        assert_eq!(sources.text_name(), Some("remote-text"));
        assert_eq!(sources.audio_name(), Some("remote-audio"));
    }
}
