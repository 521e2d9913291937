//! Error types for Samarth.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! data source, engine setup, and serialization failures.
//!
//! Question answering itself never produces an `AppError`: under-specified
//! questions and missing data are reported inside the answer. Errors only
//! surface at the edges (loading configuration, fetching datasets).

use thiserror::Error;

/// Unified error type for Samarth.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data source errors (API, cache, local files)
    #[error("Data source error: {0}")]
    Data(String),

    /// Engine setup errors (vocabulary or analysis settings)
    #[error("Engine error: {0}")]
    Engine(String),

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
