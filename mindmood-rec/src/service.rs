//! Recommendation orchestration
//!
//! One request flows: validate parameters, consult both evidence sources
//! concurrently, fuse, rank, assemble the response. Evidence failures
//! degrade to a neutral best-effort response; only invalid parameters
//! surface as errors.

use std::collections::BTreeMap;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use mindmood_common::api::{Diagnostics, EmotionDetectionResponse, RecommendResponse};
use mindmood_common::config::RecommendationConfig;
use mindmood_common::{fuse, Catalog, Error, RankingIndex, Result};

use crate::evidence::{EvidenceSources, GatheredEvidence};

/// Inputs for one recommendation
#[derive(Debug, Clone, Default)]
pub struct RecommendRequest {
    pub text: Option<String>,
    pub audio: Option<Vec<u8>>,
    /// Audio weight for hybrid fusion (configured default when `None`)
    pub alpha_audio: Option<f64>,
    /// Result count (configured default when `None`)
    pub top_k: Option<usize>,
}

/// Emotion-aware recommender
///
/// Holds the ranking index and evidence sources; shared read-only by all
/// handlers.
pub struct Recommender {
    index: RankingIndex,
    sources: EvidenceSources,
    defaults: RecommendationConfig,
}

impl Recommender {
    pub fn new(catalog: Catalog, sources: EvidenceSources, defaults: RecommendationConfig) -> Self {
        Self {
            index: RankingIndex::build(catalog),
            sources,
            defaults,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.index.catalog()
    }

    pub fn sources(&self) -> &EvidenceSources {
        &self.sources
    }

    /// Recommend catalog items for the user's current emotional state
    ///
    /// Blank text and empty audio count as absent. With neither present the
    /// fixed no-input response is returned and no source is consulted.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] for `alpha_audio` outside `[0, 1]` or `top_k == 0`.
    pub async fn recommend(&self, request: RecommendRequest) -> Result<RecommendResponse> {
        let alpha_audio = request.alpha_audio.unwrap_or(self.defaults.alpha_audio);
        if !(0.0..=1.0).contains(&alpha_audio) {
            return Err(Error::InvalidInput(format!(
                "alpha_audio must be within [0, 1], got {}",
                alpha_audio
            )));
        }

        let top_k = request.top_k.unwrap_or(self.defaults.top_k);
        if top_k == 0 {
            return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
        }

        let text = request
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        let audio = request.audio.as_deref().filter(|audio| !audio.is_empty());

        if text.is_none() && audio.is_none() {
            debug!("Recommendation requested without text or audio");
            return Ok(RecommendResponse::no_input());
        }

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("recommend", %request_id);

        async move {
            let (audio_evidence, text_evidence) = tokio::join!(
                self.sources.gather_audio(audio),
                self.sources.gather_text(text)
            );

            let diagnostics = self
                .defaults
                .include_diagnostics
                .then(|| build_diagnostics(&audio_evidence, &text_evidence));

            let fusion = match fuse(audio_evidence.result, text_evidence.result, alpha_audio) {
                Ok(fusion) => fusion,
                Err(Error::NoEvidence) => {
                    warn!(
                        has_text = text.is_some(),
                        has_audio = audio.is_some(),
                        "No evidence source produced a result, returning neutral response"
                    );
                    return Ok(RecommendResponse::no_evidence(diagnostics));
                }
                Err(e) => return Err(e),
            };

            let ranked = self.index.recommend(fusion.vector.as_array(), top_k)?;

            info!(
                source = %fusion.provenance,
                label = %fusion.label,
                returned = ranked.len(),
                "Recommendation complete"
            );

            Ok(RecommendResponse::from_ranking(&fusion, &ranked, diagnostics))
        }
        .instrument(span)
        .await
    }

    /// Classify text alone
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] for blank text
    /// - [`Error::EvidenceSourceUnavailable`] if the text source is missing, fails, or times out
    pub async fn analyze_text(&self, text: &str) -> Result<EmotionDetectionResponse> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("text must not be empty".to_string()));
        }
        required(self.sources.gather_text(Some(text)).await, "text")
    }

    /// Classify a recording alone
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] for an empty recording
    /// - [`Error::EvidenceSourceUnavailable`] if the audio source is missing, fails, or times out
    pub async fn analyze_audio(&self, audio: &[u8]) -> Result<EmotionDetectionResponse> {
        if audio.is_empty() {
            return Err(Error::InvalidInput("audio must not be empty".to_string()));
        }
        required(self.sources.gather_audio(Some(audio)).await, "audio")
    }
}

fn required(gathered: GatheredEvidence, modality: &str) -> Result<EmotionDetectionResponse> {
    match gathered.result.vector() {
        Some(vector) => Ok(EmotionDetectionResponse::from(vector)),
        None => Err(Error::EvidenceSourceUnavailable(
            gathered
                .error
                .unwrap_or_else(|| format!("{} evidence unavailable", modality)),
        )),
    }
}

fn build_diagnostics(audio: &GatheredEvidence, text: &GatheredEvidence) -> Diagnostics {
    Diagnostics {
        audio_probs: audio.result.vector().map(|vector| *vector.as_array()),
        text_probs: text.result.vector().map(|vector| *vector.as_array()),
        raw_text_probs: text
            .raw
            .as_ref()
            .map(|raw| raw.iter().map(|(label, p)| (label.clone(), *p)).collect::<BTreeMap<_, _>>()),
        audio_error: audio.error.clone(),
        text_error: text.error.clone(),
    }
}
