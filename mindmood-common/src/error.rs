//! Common error types for MindMood

use thiserror::Error;

/// Common result type for MindMood operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the recommender
#[derive(Error, Debug)]
pub enum Error {
    /// Label is not a member of the canonical emotion vocabulary
    #[error("Unknown emotion class: {0}")]
    UnknownClass(String),

    /// Fusion was invoked with neither audio nor text evidence
    #[error("No valid emotion evidence available")]
    NoEvidence,

    /// Catalog item failed load-time validation
    #[error("Invalid catalog entry: {0}")]
    InvalidCatalogEntry(String),

    /// An external evidence source failed or timed out
    #[error("Evidence source unavailable: {0}")]
    EvidenceSourceUnavailable(String),

    /// Probability vector violates the simplex invariant
    #[error("Invalid emotion vector: {0}")]
    InvalidVector(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
