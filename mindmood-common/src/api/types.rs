//! Request/response types for the recommender API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::emotion::{EmotionClass, EmotionVector, EMOTION_COUNT};
use crate::fusion::{FusionResult, Provenance};
use crate::ranking::ScoredItem;

// ========================================
// Recommendation
// ========================================

/// JSON body for `POST /api/recommend`
///
/// Text-only counterpart of the multipart `/recommend` form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecommendJsonRequest {
    pub text: Option<String>,
    pub alpha_audio: Option<f64>,
    pub top_k: Option<usize>,
}

/// One ranked catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub item_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub description: String,
    pub emotion_target: EmotionClass,
    pub score: f64,
}

impl From<&ScoredItem<'_>> for RecommendationEntry {
    fn from(scored: &ScoredItem<'_>) -> Self {
        Self {
            item_id: scored.item.item_id,
            title: scored.item.title.clone(),
            item_type: scored.item.item_type.clone(),
            description: scored.item.description.clone(),
            emotion_target: scored.item.emotion_target,
            score: scored.score,
        }
    }
}

/// Raw per-source evidence, carried through for observability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Audio evidence in canonical order (null when unavailable)
    pub audio_probs: Option<[f64; EMOTION_COUNT]>,
    /// Text evidence after remapping (null when unavailable)
    pub text_probs: Option<[f64; EMOTION_COUNT]>,
    /// Text classifier output in its own label space
    pub raw_text_probs: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_error: Option<String>,
}

/// Response for `POST /recommend` and `POST /api/recommend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub emotion_label: EmotionClass,
    pub emotion_profile: [f64; EMOTION_COUNT],
    pub source: Provenance,
    pub recommendations: Vec<RecommendationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

impl RecommendResponse {
    /// Fixed response when the caller supplied neither text nor audio
    ///
    /// `{"emotion_label":"Neutral","emotion_profile":[0,0,0,1,0],"source":"none","recommendations":[]}`
    pub fn no_input() -> Self {
        Self {
            emotion_label: EmotionClass::Neutral,
            emotion_profile: *EmotionVector::neutral().as_array(),
            source: Provenance::None,
            recommendations: Vec::new(),
            diagnostics: None,
        }
    }

    /// Best-effort neutral response when inputs were supplied but no source
    /// produced evidence
    pub fn no_evidence(diagnostics: Option<Diagnostics>) -> Self {
        Self {
            diagnostics,
            ..Self::no_input()
        }
    }

    /// Assemble the response for a fused emotion and its ranked items
    pub fn from_ranking(
        fusion: &FusionResult,
        ranked: &[ScoredItem<'_>],
        diagnostics: Option<Diagnostics>,
    ) -> Self {
        Self {
            emotion_label: fusion.label,
            emotion_profile: *fusion.vector.as_array(),
            source: fusion.provenance,
            recommendations: ranked.iter().map(RecommendationEntry::from).collect(),
            diagnostics,
        }
    }
}

// ========================================
// Single-modality analysis
// ========================================

/// JSON body for `POST /analyze/text`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
}

/// Response for `POST /analyze/text` and `POST /analyze/voice`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionDetectionResponse {
    /// Lower-cased canonical label → probability
    pub emotion_scores: BTreeMap<String, f64>,
    /// Lower-cased top label
    pub primary_emotion: String,
    /// Probability of the top label
    pub confidence: f64,
}

impl From<&EmotionVector> for EmotionDetectionResponse {
    fn from(vector: &EmotionVector) -> Self {
        let primary = vector.argmax();
        Self {
            emotion_scores: EmotionClass::all()
                .iter()
                .map(|class| (class.as_label().to_string(), vector.probability(*class)))
                .collect(),
            primary_emotion: primary.as_label().to_string(),
            confidence: vector.probability(primary),
        }
    }
}
