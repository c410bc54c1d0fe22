//! # MindMood Common Library
//!
//! Shared code for the MindMood recommender including:
//! - Canonical emotion vocabulary and probability vectors
//! - Label remapping from external classifier vocabularies
//! - Fusion of audio and text evidence
//! - Content catalog loading and validation
//! - Emotion-to-content ranking
//! - API request/response types
//! - Configuration loading

pub mod api;
pub mod catalog;
pub mod config;
pub mod emotion;
pub mod error;
pub mod fusion;
pub mod ranking;
pub mod vocabulary;

pub use catalog::{Catalog, CatalogItem};
pub use emotion::{EmotionClass, EmotionVector, EMOTION_COUNT};
pub use error::{Error, Result};
pub use fusion::{fuse, EvidenceResult, FusionResult, Provenance};
pub use ranking::{RankingIndex, ScoredItem};
pub use vocabulary::LabelRemapTable;
