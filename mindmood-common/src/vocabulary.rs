//! Emotion vocabulary and label remapping
//!
//! External classifiers report probabilities over their own label sets
//! (e.g. the distilroberta text model emits `anger`, `joy`, `sadness`, ...).
//! A [`LabelRemapTable`] routes each external label into one canonical class.
//!
//! # Remapping rules
//! - External labels are matched lower-cased
//! - Many external labels may route to the same class
//! - Mass on unmapped labels is dropped, not redistributed
//! - If no mass survives, `remap` returns one-hot on the fallback class (`Neutral`)
//!   and `try_remap` returns `None`
//! - The surviving mass is renormalized to sum to 1.0

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::emotion::{EmotionClass, EmotionVector, EMOTION_COUNT};
use crate::{Error, Result};

/// Canonical classes in vocabulary order
pub fn classes() -> &'static [EmotionClass] {
    EmotionClass::all()
}

/// Vector position of a canonical label
///
/// Fails with [`Error::UnknownClass`] for labels outside the vocabulary.
pub fn index_of(label: &str) -> Result<usize> {
    label.parse::<EmotionClass>().map(|class| class.index())
}

/// Mapping from an external classifier's labels into the canonical vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRemapTable {
    entries: BTreeMap<String, EmotionClass>,
    fallback: EmotionClass,
}

impl LabelRemapTable {
    /// Empty table with `Neutral` fallback
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback: EmotionClass::Neutral,
        }
    }

    /// Add a mapping (the external label is stored lower-cased)
    pub fn with_mapping(mut self, external_label: &str, class: EmotionClass) -> Self {
        self.entries
            .insert(external_label.trim().to_lowercase(), class);
        self
    }

    /// Table for the j-hartmann distilroberta emotion model
    ///
    /// `surprise` has no canonical counterpart and is dropped.
    pub fn distilroberta() -> Self {
        Self::new()
            .with_mapping("anger", EmotionClass::Angry)
            .with_mapping("disgust", EmotionClass::Disgusted)
            .with_mapping("joy", EmotionClass::Amused)
            .with_mapping("neutral", EmotionClass::Neutral)
            .with_mapping("sadness", EmotionClass::Sleepy)
            .with_mapping("fear", EmotionClass::Sleepy)
    }

    /// Identity table for classifiers emitting lower-cased canonical labels
    pub fn canonical() -> Self {
        EmotionClass::all()
            .iter()
            .fold(Self::new(), |table, class| {
                table.with_mapping(class.as_label(), *class)
            })
    }

    /// Look up a built-in table by name (`distilroberta` or `canonical`)
    pub fn named(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "distilroberta" => Ok(Self::distilroberta()),
            "canonical" => Ok(Self::canonical()),
            other => Err(Error::Config(format!(
                "Unknown label table '{}' (expected 'distilroberta' or 'canonical')",
                other
            ))),
        }
    }

    /// Build a validated table from configuration entries
    ///
    /// Fails fast on empty external labels and on targets outside the
    /// canonical vocabulary, so a malformed table never reaches request handling.
    pub fn from_entries(entries: &HashMap<String, String>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config("Label table has no entries".to_string()));
        }

        let mut table = Self::new();
        for (external_label, target) in entries {
            if external_label.trim().is_empty() {
                return Err(Error::Config(
                    "Label table contains an empty external label".to_string(),
                ));
            }
            let class = target.parse::<EmotionClass>()?;
            table = table.with_mapping(external_label, class);
        }
        Ok(table)
    }

    /// Canonical class for an external label, if mapped
    pub fn target_of(&self, external_label: &str) -> Option<EmotionClass> {
        self.entries.get(&external_label.trim().to_lowercase()).copied()
    }

    /// Number of external labels in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table maps no labels at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project an external probability distribution onto the canonical vocabulary
    ///
    /// Falls back to one-hot `Neutral` when no mass survives; see [`Self::try_remap`]
    /// for callers that must tell that case apart.
    pub fn remap(&self, external: &HashMap<String, f64>) -> EmotionVector {
        self.try_remap(external).unwrap_or_else(|| {
            debug!(
                fallback = %self.fallback,
                "No mappable mass, using fallback class"
            );
            EmotionVector::one_hot(self.fallback)
        })
    }

    /// Project onto the canonical vocabulary, or `None` when no mass maps
    ///
    /// Labels are accumulated in sorted order so the floating-point result is
    /// identical for identical input regardless of map iteration order.
    pub fn try_remap(&self, external: &HashMap<String, f64>) -> Option<EmotionVector> {
        let mut labels: Vec<(&String, &f64)> = external.iter().collect();
        labels.sort_by(|a, b| a.0.cmp(b.0));

        let mut accumulated = [0.0; EMOTION_COUNT];
        for (label, &mass) in labels {
            let Some(class) = self.target_of(label) else {
                debug!(label = %label, mass = mass, "Dropping unmapped external label");
                continue;
            };
            if !mass.is_finite() || mass < 0.0 {
                warn!(label = %label, mass = mass, "Dropping invalid probability mass");
                continue;
            }
            accumulated[class.index()] += mass;
        }

        let total: f64 = accumulated.iter().sum();
        if total <= 0.0 {
            return None;
        }

        for value in accumulated.iter_mut() {
            *value /= total;
        }
        Some(EmotionVector::from_normalized(accumulated))
    }
}

impl Default for LabelRemapTable {
    fn default() -> Self {
        Self::new()
    }
}
