//! Error types for the Unity Companion backend.
//!
//! A single error enum covers configuration, I/O, LLM, knowledge base,
//! prompt and serialization failures.

use thiserror::Error;

/// Unified error type for the companion crates.
///
/// Provider failures are recovered inside the generator and never reach an
/// HTTP caller; knowledge and configuration errors are fatal at startup.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base loading errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Malformed chat requests
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
