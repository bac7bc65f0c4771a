//! Error types for sonemica-analysis
//!
//! Every failure in the core is deterministic for a given input, so nothing here is
//! retried locally: errors are returned to the caller as soon as they are detected.

use crate::types::{ClassifierError, ProviderError};
use thiserror::Error;

/// Analysis error type
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No track survived the join, or an empty song set reached an aggregate
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A reference row lacks a numeric field the affect computation requires
    #[error("Malformed record '{title}' by '{artist}': missing or invalid field {field}")]
    MalformedRecord {
        title: String,
        artist: String,
        field: &'static str,
    },

    /// Fusion weights rejected at construction
    #[error("Invalid fusion weights: {0}")]
    InvalidWeights(String),

    /// Sentiment classifier failure
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Reference data provider failure
    #[error("Reference data error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
