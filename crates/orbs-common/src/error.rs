//! Error types for the Skill Orbs workspace
//!
//! The engine itself never fails: anomalies degrade to placeholders or no-ops.
//! These errors surface at the edges (table construction, feed validation,
//! configuration and trace loading).

use thiserror::Error;

/// Result type alias using OrbsError
pub type Result<T> = std::result::Result<T, OrbsError>;

/// Unified error type for Skill Orbs operations
#[derive(Debug, Error)]
pub enum OrbsError {
    // Experience table errors
    #[error("Experience table error: {0}")]
    Table(#[from] TableError),

    // Feed entry errors
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Session trace errors
    #[error("Trace error at line {line}: {reason}")]
    Trace { line: usize, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(String),
}

/// Experience table construction errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("Table must contain {expected} thresholds, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Threshold for level {level} ({value}) is below level {prev_level} ({prev_value})")]
    NotMonotonic {
        level: u32,
        value: f64,
        prev_level: u32,
        prev_value: f64,
    },

    #[error("Threshold for level {level} is not a finite number")]
    NotFinite { level: u32 },
}

/// Skill feed entry validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedError {
    #[error("Entry is not an object")]
    NotAnObject,

    #[error("Field `{field}` is missing")]
    MissingField { field: &'static str },

    #[error("Field `{field}` has the wrong type")]
    WrongType { field: &'static str },
}

impl From<serde_json::Error> for OrbsError {
    fn from(err: serde_json::Error) -> Self {
        OrbsError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for OrbsError {
    fn from(err: std::io::Error) -> Self {
        OrbsError::Io(err.to_string())
    }
}
