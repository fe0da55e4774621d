//! Error types for the cipher breaker.
//!
//! Engine operations never return these: invalid or weak input degrades to an
//! empty, zero-confidence result. Errors only surface from the ambient layers
//! (configuration, language-profile parsing and persistence).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BreakerError {
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Invalid frequency profile for '{language}': {reason}")]
    InvalidProfile { language: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BreakerError>;
