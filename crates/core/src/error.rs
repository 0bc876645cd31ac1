//! Error types for the Vigia core crate.

use thiserror::Error;

/// Top-level error type for all Vigia operations.
#[derive(Debug, Error)]
pub enum VigiaError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory error: {0}")]
    Directory(String),

    #[error("SGU error: {0}")]
    Sgu(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// A convenience Result alias that defaults to [`VigiaError`].
pub type Result<T> = std::result::Result<T, VigiaError>;
