//! Content catalog
//!
//! Items (exercises, meditations, playlists, journaling prompts) are each
//! tagged with exactly one target emotion. The catalog is loaded once at
//! startup and is read-only thereafter; changes require a restart.
//!
//! Validation is fail-fast: an unknown emotion tag or a duplicate item id
//! aborts the load with [`Error::InvalidCatalogEntry`]. Entries are never
//! silently dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::emotion::EmotionClass;
use crate::{Error, Result};

/// One recommendable content item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub item_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub description: String,
    pub emotion_target: EmotionClass,
}

/// Catalog entry as written in a catalog file, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalogItem {
    pub item_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub description: String,
    pub emotion_target: String,
}

/// Accepted catalog file shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { items: Vec<RawCatalogItem> },
    List(Vec<RawCatalogItem>),
}

/// Ordered, validated collection of catalog items
///
/// Item order is the natural order used to break ranking ties.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Validate raw entries into a catalog, preserving their order
    pub fn from_items(raw_items: Vec<RawCatalogItem>) -> Result<Self> {
        let mut seen_ids = HashSet::new();
        let mut items = Vec::with_capacity(raw_items.len());

        for raw in raw_items {
            if !seen_ids.insert(raw.item_id) {
                return Err(Error::InvalidCatalogEntry(format!(
                    "duplicate item_id {} ('{}')",
                    raw.item_id, raw.title
                )));
            }

            let emotion_target = raw.emotion_target.parse::<EmotionClass>().map_err(|_| {
                Error::InvalidCatalogEntry(format!(
                    "item {} ('{}') has unknown emotion_target '{}'",
                    raw.item_id, raw.title, raw.emotion_target
                ))
            })?;

            items.push(CatalogItem {
                item_id: raw.item_id,
                title: raw.title,
                item_type: raw.item_type,
                description: raw.description,
                emotion_target,
            });
        }

        if items.is_empty() {
            warn!("Catalog is empty - every recommendation list will be empty");
        }

        Ok(Self { items })
    }

    /// Load a catalog file
    ///
    /// Format is chosen by extension:
    /// - `.json`: a list of items, or `{"items": [...]}`
    /// - `.toml`: `[[items]]` tables
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let parsed: CatalogFile = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("Parse catalog {} failed: {}", path.display(), e))
            })?,
            Some("toml") => toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Parse catalog {} failed: {}", path.display(), e))
            })?,
            _ => {
                return Err(Error::Config(format!(
                    "Unsupported catalog format: {} (expected .json or .toml)",
                    path.display()
                )))
            }
        };

        let raw_items = match parsed {
            CatalogFile::Wrapped { items } => items,
            CatalogFile::List(items) => items,
        };

        let catalog = Self::from_items(raw_items)?;
        info!(
            path = %path.display(),
            items = catalog.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Built-in demo catalog (nine items)
    pub fn sample() -> Self {
        let entries: [(i64, &str, &str, &str, EmotionClass); 9] = [
            (
                1,
                "5-minute calming breathing",
                "exercise",
                "Short guided breathing to reduce stress and calm your nervous system",
                EmotionClass::Angry,
            ),
            (
                2,
                "Gentle sleep meditation",
                "meditation",
                "Soft voice guidance to help you unwind and fall asleep peacefully",
                EmotionClass::Sleepy,
            ),
            (
                3,
                "Energy-boost happy playlist",
                "music",
                "Upbeat positive tracks to lift your mood",
                EmotionClass::Amused,
            ),
            (
                4,
                "Grounding body scan",
                "meditation",
                "Scan through your body to release tension and come back to the present moment",
                EmotionClass::Neutral,
            ),
            (
                5,
                "Journaling prompt pack",
                "journal",
                "Guided prompts to process intense emotions in a safe structured way",
                EmotionClass::Angry,
            ),
            (
                6,
                "Slow mindful stretching",
                "exercise",
                "Gentle stretching to relax your muscles and regulate your breathing",
                EmotionClass::Neutral,
            ),
            (
                7,
                "Cooling down after conflict",
                "exercise",
                "A structured way to cool down after an argument and regain control",
                EmotionClass::Angry,
            ),
            (
                8,
                "Quiet focus playlist",
                "music",
                "Low distraction tracks to help you focus and stabilize your mood",
                EmotionClass::Neutral,
            ),
            (
                9,
                "Light amusement video suggestion",
                "video",
                "Watch something light and funny to gently lift your mood without overstimulation",
                EmotionClass::Amused,
            ),
        ];

        let items = entries
            .into_iter()
            .map(|(item_id, title, item_type, description, emotion_target)| CatalogItem {
                item_id,
                title: title.to_string(),
                item_type: item_type.to_string(),
                description: description.to_string(),
                emotion_target,
            })
            .collect();

        Self { items }
    }

    /// Items in natural order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Item by id
    pub fn get(&self, item_id: i64) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(item_id: i64, emotion_target: &str) -> RawCatalogItem {
        RawCatalogItem {
            item_id,
            title: format!("Item {}", item_id),
            item_type: "exercise".to_string(),
            description: String::new(),
            emotion_target: emotion_target.to_string(),
        }
    }

    #[test]
    fn test_sample_catalog_composition() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.len(), 9);

        let count = |class: EmotionClass| {
            catalog
                .items()
                .iter()
                .filter(|item| item.emotion_target == class)
                .count()
        };
        assert_eq!(count(EmotionClass::Angry), 3);
        assert_eq!(count(EmotionClass::Sleepy), 1);
        assert_eq!(count(EmotionClass::Amused), 2);
        assert_eq!(count(EmotionClass::Neutral), 3);
        assert_eq!(count(EmotionClass::Disgusted), 0);
    }

    #[test]
    fn test_from_items_preserves_order() {
        let catalog = Catalog::from_items(vec![raw(3, "Angry"), raw(1, "sleepy"), raw(2, "NEUTRAL")]).unwrap();
        let ids: Vec<i64> = catalog.items().iter().map(|item| item.item_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(catalog.get(1).unwrap().emotion_target, EmotionClass::Sleepy);
        assert!(catalog.get(42).is_none());
    }

    #[test]
    fn test_unknown_tag_fails_load() {
        let result = Catalog::from_items(vec![raw(1, "Angry"), raw(2, "Happy")]);
        match result {
            Err(Error::InvalidCatalogEntry(message)) => {
                assert!(message.contains("Happy"), "unexpected message: {}", message);
            }
            other => panic!("Expected InvalidCatalogEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_id_fails_load() {
        let result = Catalog::from_items(vec![raw(1, "Angry"), raw(1, "Sleepy")]);
        assert!(matches!(result, Err(Error::InvalidCatalogEntry(_))));
    }

    #[test]
    fn test_item_serializes_type_field() {
        let catalog = Catalog::sample();
        let json = serde_json::to_value(&catalog.items()[0]).unwrap();
        assert_eq!(json["type"], "exercise");
        assert_eq!(json["emotion_target"], "Angry");
        assert_eq!(json["item_id"], 1);
    }
}
