//! Error types shared across the crate.

use thiserror::Error;

/// Errors raised while validating a submitted profile.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// The name is blank or sanitizes to nothing usable as a file key.
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// A required field is missing or empty.
    #[error("Missing required data: {0}")]
    Missing(&'static str),

    /// An entry is present but malformed (bad score, empty animal, ...).
    #[error("Malformed entry: {0}")]
    Malformed(String),
}

/// Errors from the on-disk profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The name could not be turned into a storage key.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Errors raised while computing or rasterizing a radar chart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChartError {
    /// Angle spacing is undefined without at least one category.
    #[error("Cannot build a radar chart with zero categories")]
    NoCategories,

    /// The skill and interest series have different lengths.
    #[error("Series length mismatch: {skills} skills vs {interests} interests")]
    LengthMismatch { skills: usize, interests: usize },

    /// The two series disagree on the category at some position.
    #[error("Category mismatch at position {index}: {skill:?} vs {interest:?}")]
    CategoryMismatch {
        index: usize,
        skill: String,
        interest: String,
    },

    /// The interest scale must be at least 1.
    #[error("Invalid interest scale: {0}")]
    InvalidScale(u8),

    /// The embedded chart font could not be loaded.
    #[error("Font error: {0}")]
    Font(String),

    /// The drawing backend rejected a shape or label.
    #[error("Drawing error: {0}")]
    Draw(String),

    /// PNG encoding failed.
    #[error("Image encoding error: {0}")]
    Encode(String),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but does not parse.
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}
