//! Ranking Engine
//!
//! Scores every catalog item against a fused emotion profile and returns
//! the top-K list.
//!
//! # Similarity metric
//! Each item carries a one-hot target vector (1.0 at its target emotion).
//! The score is the dot product of that vector with the profile, which
//! collapses to the profile's probability for the item's target emotion.
//!
//! This is a degenerate cosine similarity: it equals cosine similarity only
//! because the item vector is one-hot (unit norm) and ordering by score is
//! unaffected by the profile's norm. Items tagged with several emotions
//! would need the metric revisited.
//!
//! # Ordering
//! Descending score; equal scores keep catalog order (stable sort), so
//! results are reproducible run to run. An all-zero profile scores every
//! item 0.0 and returns the catalog's natural order, truncated.

use tracing::debug;

use crate::catalog::{Catalog, CatalogItem};
use crate::emotion::EMOTION_COUNT;
use crate::{Error, Result};

/// Catalog item with its score for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
}

/// Catalog plus its precomputed one-hot target matrix
///
/// Built once per catalog load and shared read-only by all requests.
#[derive(Debug, Clone)]
pub struct RankingIndex {
    catalog: Catalog,
    targets: Vec<[f64; EMOTION_COUNT]>,
}

impl RankingIndex {
    /// Precompute one-hot target vectors for every item
    pub fn build(catalog: Catalog) -> Self {
        let targets = catalog
            .items()
            .iter()
            .map(|item| {
                let mut row = [0.0; EMOTION_COUNT];
                row[item.emotion_target.index()] = 1.0;
                row
            })
            .collect();

        Self { catalog, targets }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rank the catalog against an emotion profile
    ///
    /// Returns at most `top_k` items and never more than the catalog holds.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] if `top_k` is zero.
    pub fn recommend(
        &self,
        profile: &[f64; EMOTION_COUNT],
        top_k: usize,
    ) -> Result<Vec<ScoredItem<'_>>> {
        if top_k == 0 {
            return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
        }

        let mut scored: Vec<ScoredItem<'_>> = self
            .catalog
            .items()
            .iter()
            .zip(self.targets.iter())
            .map(|(item, target)| ScoredItem {
                item,
                score: dot(target, profile),
            })
            .collect();

        // sort_by is stable: ties keep catalog order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);

        debug!(
            top_k = top_k,
            returned = scored.len(),
            catalog_size = self.catalog.len(),
            "Ranked catalog"
        );

        Ok(scored)
    }
}

fn dot(a: &[f64; EMOTION_COUNT], b: &[f64; EMOTION_COUNT]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionClass, EmotionVector};

    fn ids(results: &[ScoredItem<'_>]) -> Vec<i64> {
        results.iter().map(|scored| scored.item.item_id).collect()
    }

    #[test]
    fn test_pure_angry_profile() {
        let index = RankingIndex::build(Catalog::sample());
        let profile = EmotionVector::one_hot(EmotionClass::Angry);

        let results = index.recommend(profile.as_array(), 3).unwrap();

        assert_eq!(ids(&results), vec![1, 5, 7]);
        assert!(results.iter().all(|scored| scored.score == 1.0));
        assert!(results
            .iter()
            .all(|scored| scored.item.emotion_target == EmotionClass::Angry));
    }

    #[test]
    fn test_mixed_profile_scores() {
        let index = RankingIndex::build(Catalog::sample());
        let profile = EmotionVector::new([0.5, 0.3, 0.0, 0.2, 0.0]).unwrap();

        let results = index.recommend(profile.as_array(), 9).unwrap();

        // Amused items (3, 9) then Angry (1, 5, 7) then Neutral (4, 6, 8) then Sleepy (2)
        assert_eq!(ids(&results), vec![3, 9, 1, 5, 7, 4, 6, 8, 2]);
        assert_eq!(results[0].score, 0.5);
        assert_eq!(results[2].score, 0.3);
        assert_eq!(results[5].score, 0.2);
        assert_eq!(results[8].score, 0.0);
    }

    #[test]
    fn test_top_k_larger_than_catalog() {
        let index = RankingIndex::build(Catalog::sample());
        let results = index
            .recommend(EmotionVector::neutral().as_array(), 50)
            .unwrap();
        assert_eq!(results.len(), 9);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let index = RankingIndex::build(Catalog::sample());
        let result = index.recommend(EmotionVector::neutral().as_array(), 0);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_all_zero_profile_returns_natural_order() {
        let index = RankingIndex::build(Catalog::sample());
        let results = index.recommend(&[0.0; EMOTION_COUNT], 4).unwrap();

        assert_eq!(ids(&results), vec![1, 2, 3, 4]);
        assert!(results.iter().all(|scored| scored.score == 0.0));
    }

    #[test]
    fn test_ranking_is_stable_across_calls() {
        let index = RankingIndex::build(Catalog::sample());
        let profile = EmotionVector::new([0.2, 0.2, 0.2, 0.2, 0.2]).unwrap();

        let first = index.recommend(profile.as_array(), 9).unwrap();
        assert_eq!(ids(&first), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        for _ in 0..5 {
            assert_eq!(index.recommend(profile.as_array(), 9).unwrap(), first);
        }
    }

    #[test]
    fn test_empty_catalog() {
        let index = RankingIndex::build(Catalog::from_items(vec![]).unwrap());
        let results = index
            .recommend(EmotionVector::neutral().as_array(), 5)
            .unwrap();
        assert!(results.is_empty());
    }
}
