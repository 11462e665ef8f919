//! Error types for the insulin_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for insulin_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A calculation was called with arguments its contract forbids
    /// (e.g. a non-positive TDD reaching a correction-factor division).
    /// This is a caller bug, not a recoverable user error.
    #[error("Invalid precondition: {0}")]
    InvalidPrecondition(String),

    /// Raw input rejected by the input layer
    #[error("Invalid input: {0}")]
    Validation(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
