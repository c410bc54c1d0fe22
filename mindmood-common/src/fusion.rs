//! Fusion Engine
//!
//! Combines audio and text emotion evidence into one distribution.
//!
//! # Case table
//! | audio | text | final vector                                   | provenance   |
//! |-------|------|------------------------------------------------|--------------|
//! | yes   | no   | audio, unchanged                               | `audio_only` |
//! | no    | yes  | text, unchanged                                | `text_only`  |
//! | yes   | yes  | `alpha * audio + (1 - alpha) * text`           | `hybrid`     |
//! | no    | no   | fails with [`Error::NoEvidence`]               | -            |
//!
//! Both inputs lie on the probability simplex and the weights sum to 1, so the
//! hybrid combination also lies on the simplex. No renormalization is applied.
//!
//! # Example
//! ```
//! use mindmood_common::{fuse, EmotionClass, EmotionVector, EvidenceResult, Provenance};
//!
//! let audio = EmotionVector::one_hot(EmotionClass::Amused);
//! let text = EmotionVector::one_hot(EmotionClass::Neutral);
//! let fused = fuse(
//!     EvidenceResult::Available(audio),
//!     EvidenceResult::Available(text),
//!     0.7,
//! )
//! .unwrap();
//!
//! assert_eq!(fused.provenance, Provenance::Hybrid);
//! assert_eq!(fused.label, EmotionClass::Amused);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::emotion::{EmotionClass, EmotionVector, EMOTION_COUNT};
use crate::{Error, Result};

/// Audio weight used when the caller does not supply one
pub const DEFAULT_ALPHA_AUDIO: f64 = 0.7;

/// Output of one evidence source
///
/// `Unavailable` is distinct from any vector: absence of signal is never
/// treated as a uniform or winning distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvidenceResult {
    Available(EmotionVector),
    Unavailable,
}

impl EvidenceResult {
    /// The vector, if the source produced one
    pub fn vector(&self) -> Option<&EmotionVector> {
        match self {
            EvidenceResult::Available(vector) => Some(vector),
            EvidenceResult::Unavailable => None,
        }
    }
}

/// Which evidence sources contributed to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    AudioOnly,
    TextOnly,
    Hybrid,
    /// No evidence; only produced by the service layer's neutral responses
    None,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::AudioOnly => "audio_only",
            Provenance::TextOnly => "text_only",
            Provenance::Hybrid => "hybrid",
            Provenance::None => "none",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fused emotion for one recommendation request
#[derive(Debug, Clone, PartialEq)]
pub struct FusionResult {
    /// Final distribution
    pub vector: EmotionVector,
    /// Contributing sources
    pub provenance: Provenance,
    /// Top class (lower index wins ties)
    pub label: EmotionClass,
    /// Audio evidence as received, for diagnostics
    pub audio: Option<EmotionVector>,
    /// Text evidence as received, for diagnostics
    pub text: Option<EmotionVector>,
}

/// Fuse audio and text evidence
///
/// `alpha_audio` is the audio weight in `[0, 1]`. It is only consulted (and
/// only validated) when both sources are available.
///
/// # Errors
/// - [`Error::NoEvidence`] if both sources are unavailable
/// - [`Error::InvalidInput`] if both are available and `alpha_audio` is outside `[0, 1]`
pub fn fuse(
    audio: EvidenceResult,
    text: EvidenceResult,
    alpha_audio: f64,
) -> Result<FusionResult> {
    let (vector, provenance) = match (audio, text) {
        (EvidenceResult::Available(audio), EvidenceResult::Unavailable) => {
            (audio, Provenance::AudioOnly)
        }
        (EvidenceResult::Unavailable, EvidenceResult::Available(text)) => {
            (text, Provenance::TextOnly)
        }
        (EvidenceResult::Available(audio), EvidenceResult::Available(text)) => {
            (weighted_blend(&audio, &text, alpha_audio)?, Provenance::Hybrid)
        }
        (EvidenceResult::Unavailable, EvidenceResult::Unavailable) => {
            return Err(Error::NoEvidence);
        }
    };

    let label = vector.argmax();

    debug!(
        provenance = %provenance,
        label = %label,
        profile = ?vector.as_array(),
        "Fused emotion evidence"
    );

    Ok(FusionResult {
        vector,
        provenance,
        label,
        audio: audio.vector().copied(),
        text: text.vector().copied(),
    })
}

/// Element-wise `alpha * audio + (1 - alpha) * text`
fn weighted_blend(
    audio: &EmotionVector,
    text: &EmotionVector,
    alpha_audio: f64,
) -> Result<EmotionVector> {
    if !(0.0..=1.0).contains(&alpha_audio) {
        return Err(Error::InvalidInput(format!(
            "alpha_audio must be within [0, 1], got {}",
            alpha_audio
        )));
    }

    let audio = audio.as_array();
    let text = text.as_array();
    let mut blended = [0.0; EMOTION_COUNT];
    for (index, value) in blended.iter_mut().enumerate() {
        *value = alpha_audio * audio[index] + (1.0 - alpha_audio) * text[index];
    }

    Ok(EmotionVector::from_normalized(blended))
}
