//! Keyword heuristic text classifier
//!
//! Every canonical label starts at 1/5; each keyword found in the
//! lower-cased text adds 0.15 to its label. Scores are normalized before
//! they are returned. Matching is substring-based, so "unhappy" counts
//! toward `amused`; this classifier is a stand-in for a real text model.

use async_trait::async_trait;
use std::collections::HashMap;

use mindmood_common::{EmotionClass, LabelRemapTable, Result, EMOTION_COUNT};

use super::TextEvidenceSource;

/// Added to a label per matching keyword
const KEYWORD_BOOST: f64 = 0.15;

const AMUSED_KEYWORDS: &[&str] = &[
    "happy", "joy", "excited", "wonderful", "great", "love", "amazing", "fantastic", "laugh",
    "fun", "funny",
];
const ANGRY_KEYWORDS: &[&str] = &[
    "angry", "furious", "mad", "frustrated", "annoyed", "irritated", "rage", "upset", "hate",
];
const DISGUSTED_KEYWORDS: &[&str] = &[
    "disgusted", "repulsed", "gross", "yuck", "awful", "horrible", "disgusting",
];
const NEUTRAL_KEYWORDS: &[&str] = &["okay", "fine", "normal", "alright", "meh", "so-so"];
const SLEEPY_KEYWORDS: &[&str] = &[
    "tired", "sleepy", "exhausted", "drowsy", "fatigue", "worn out", "drained",
];

fn keywords_for(class: EmotionClass) -> &'static [&'static str] {
    match class {
        EmotionClass::Amused => AMUSED_KEYWORDS,
        EmotionClass::Angry => ANGRY_KEYWORDS,
        EmotionClass::Disgusted => DISGUSTED_KEYWORDS,
        EmotionClass::Neutral => NEUTRAL_KEYWORDS,
        EmotionClass::Sleepy => SLEEPY_KEYWORDS,
    }
}

/// Built-in text classifier emitting lower-cased canonical labels
#[derive(Debug, Clone)]
pub struct KeywordTextClassifier {
    table: LabelRemapTable,
}

impl KeywordTextClassifier {
    pub fn new() -> Self {
        Self {
            table: LabelRemapTable::canonical(),
        }
    }

    /// Score text synchronously
    pub fn score(&self, text: &str) -> HashMap<String, f64> {
        let lowered = text.to_lowercase();
        let base = 1.0 / EMOTION_COUNT as f64;

        let raw: Vec<(EmotionClass, f64)> = EmotionClass::all()
            .iter()
            .map(|class| {
                let hits = keywords_for(*class)
                    .iter()
                    .filter(|keyword| lowered.contains(*keyword))
                    .count();
                (*class, base + KEYWORD_BOOST * hits as f64)
            })
            .collect();

        let total: f64 = raw.iter().map(|(_, score)| score).sum();
        raw.into_iter()
            .map(|(class, score)| (class.as_label().to_string(), score / total))
            .collect()
    }
}

impl Default for KeywordTextClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextEvidenceSource for KeywordTextClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn label_table(&self) -> &LabelRemapTable {
        &self.table
    }

    async fn predict(&self, text: &str) -> Result<HashMap<String, f64>> {
        Ok(self.score(text))
    }
}
