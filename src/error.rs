//! Error types for the fintech advisor

use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Conversation Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Empty generation: {0}")]
    EmptyGeneration(String),

    #[error("Empty user input")]
    EmptyInput,

    #[error("Data fetch error: {0}")]
    DataFetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}
