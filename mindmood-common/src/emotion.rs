//! Canonical emotion vocabulary and probability vectors
//!
//! Every vector, catalog tag and external-label mapping in the recommender
//! is expressed over the same five classes in the same order:
//!
//! | Index | Class     |
//! |-------|-----------|
//! | 0     | Amused    |
//! | 1     | Angry     |
//! | 2     | Disgusted |
//! | 3     | Neutral   |
//! | 4     | Sleepy    |
//!
//! The order is fixed for the lifetime of the system. Ties in [`EmotionVector::argmax`]
//! resolve to the lower index, so reordering the enum changes which content
//! users are shown.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::{Error, Result};

/// Number of canonical emotion classes
pub const EMOTION_COUNT: usize = 5;

/// Allowed deviation of a probability vector's sum from 1.0
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Canonical emotion classes, in vocabulary order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmotionClass {
    Amused,
    Angry,
    Disgusted,
    Neutral,
    Sleepy,
}

impl EmotionClass {
    /// All classes in canonical order
    pub const ALL: [EmotionClass; EMOTION_COUNT] = [
        EmotionClass::Amused,
        EmotionClass::Angry,
        EmotionClass::Disgusted,
        EmotionClass::Neutral,
        EmotionClass::Sleepy,
    ];

    /// Position of this class in every emotion vector
    pub fn index(&self) -> usize {
        match self {
            EmotionClass::Amused => 0,
            EmotionClass::Angry => 1,
            EmotionClass::Disgusted => 2,
            EmotionClass::Neutral => 3,
            EmotionClass::Sleepy => 4,
        }
    }

    /// Class at the given vector position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get all classes in canonical order
    ///
    /// Useful for UI listings and validation
    pub fn all() -> &'static [EmotionClass] {
        &Self::ALL
    }

    /// Display name, as used in API responses and catalog tags
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionClass::Amused => "Amused",
            EmotionClass::Angry => "Angry",
            EmotionClass::Disgusted => "Disgusted",
            EmotionClass::Neutral => "Neutral",
            EmotionClass::Sleepy => "Sleepy",
        }
    }

    /// Lower-cased label, as emitted by classifiers that already speak
    /// the canonical vocabulary
    pub fn as_label(&self) -> &'static str {
        match self {
            EmotionClass::Amused => "amused",
            EmotionClass::Angry => "angry",
            EmotionClass::Disgusted => "disgusted",
            EmotionClass::Neutral => "neutral",
            EmotionClass::Sleepy => "sleepy",
        }
    }
}

impl FromStr for EmotionClass {
    type Err = Error;

    /// Parse a class name (case-insensitive, surrounding whitespace ignored)
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "amused" => Ok(EmotionClass::Amused),
            "angry" => Ok(EmotionClass::Angry),
            "disgusted" => Ok(EmotionClass::Disgusted),
            "neutral" => Ok(EmotionClass::Neutral),
            "sleepy" => Ok(EmotionClass::Sleepy),
            _ => Err(Error::UnknownClass(s.to_string())),
        }
    }
}

impl std::fmt::Display for EmotionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Probability mass function over the canonical emotion classes
///
/// Entries are non-negative and sum to 1.0 within [`PROBABILITY_TOLERANCE`].
/// A vector cannot be modified after construction.
///
/// Serializes as a plain JSON array of five numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct EmotionVector([f64; EMOTION_COUNT]);

impl EmotionVector {
    /// Validate and (if needed) renormalize raw probabilities
    ///
    /// Fails with [`Error::InvalidVector`] when an entry is negative or not
    /// finite, or when every entry is zero. A sum outside `1 ± 1e-6` is
    /// divided out.
    pub fn new(values: [f64; EMOTION_COUNT]) -> Result<Self> {
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(Error::InvalidVector(format!(
                "{} probability is {} (must be finite and non-negative)",
                EmotionClass::ALL[index],
                value
            )));
        }

        let sum: f64 = values.iter().sum();
        if sum <= 0.0 {
            return Err(Error::InvalidVector(
                "all probabilities are zero".to_string(),
            ));
        }

        if (sum - 1.0).abs() <= PROBABILITY_TOLERANCE {
            return Ok(Self(values));
        }

        debug!(sum = sum, "Renormalizing emotion vector");
        let mut normalized = values;
        for value in normalized.iter_mut() {
            *value /= sum;
        }
        Ok(Self(normalized))
    }

    /// Wrap values already known to lie on the simplex
    pub(crate) fn from_normalized(values: [f64; EMOTION_COUNT]) -> Self {
        debug_assert!((values.iter().sum::<f64>() - 1.0).abs() <= PROBABILITY_TOLERANCE);
        Self(values)
    }

    /// Vector with full mass on a single class
    pub fn one_hot(class: EmotionClass) -> Self {
        let mut values = [0.0; EMOTION_COUNT];
        values[class.index()] = 1.0;
        Self(values)
    }

    /// One-hot `Neutral`, the fallback distribution
    pub fn neutral() -> Self {
        Self::one_hot(EmotionClass::Neutral)
    }

    /// Most probable class
    ///
    /// On an exact tie the class earlier in the vocabulary wins.
    pub fn argmax(&self) -> EmotionClass {
        let mut best = 0;
        for index in 1..EMOTION_COUNT {
            if self.0[index] > self.0[best] {
                best = index;
            }
        }
        EmotionClass::ALL[best]
    }

    /// Probability assigned to a class
    pub fn probability(&self, class: EmotionClass) -> f64 {
        self.0[class.index()]
    }

    /// Raw entries in canonical order
    pub fn as_array(&self) -> &[f64; EMOTION_COUNT] {
        &self.0
    }

    /// Sum of all entries (1.0 within tolerance)
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl AsRef<[f64; EMOTION_COUNT]> for EmotionVector {
    fn as_ref(&self) -> &[f64; EMOTION_COUNT] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for EmotionVector {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        let len = values.len();
        let array: [f64; EMOTION_COUNT] = values.try_into().map_err(|_| {
            Error::InvalidVector(format!(
                "expected {} probabilities, got {}",
                EMOTION_COUNT, len
            ))
        })?;
        Self::new(array)
    }
}

impl From<EmotionVector> for Vec<f64> {
    fn from(vector: EmotionVector) -> Self {
        vector.0.to_vec()
    }
}
