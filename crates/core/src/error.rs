//! Error types for the Clause contract assistant.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, model providers, the contract
//! store, retrieval, request validation and serialization.

use thiserror::Error;

/// Unified error type for Clause.
///
/// All fallible functions return `Result<T, AppError>`.
/// Collaborator failures are converted into degraded answers by the
/// knowledge crate; only request validation reaches the caller as an error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language model and embedding provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Contract store (SQLite) errors
    #[error("Store error: {0}")]
    Store(String),

    /// Retrieval, grounding and corpus loading errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Inbound request failed validation
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
