// src/error.rs

//! Unified error handling for the trend radar.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for trend radar operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file (config, keyword rules) does not exist
    #[error("Missing resource: {path}")]
    MissingResource { path: String },

    /// A snapshot line could not be parsed
    #[error("Malformed record '{line}': {message}")]
    MalformedRecord { line: String, message: String },

    /// Configuration values are inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input value
    #[error("Validation error: {0}")]
    Validation(String),

    /// External summarizer failed
    #[error("Summarizer error: {0}")]
    Summarizer(String),
}

impl AppError {
    /// Create a missing-resource error for a path.
    pub fn missing(path: impl AsRef<Path>) -> Self {
        Self::MissingResource {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a malformed-record error for a snapshot line.
    pub fn malformed(line: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedRecord {
            line: line.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a summarizer error.
    pub fn summarizer(message: impl fmt::Display) -> Self {
        Self::Summarizer(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_resource_display() {
        let err = AppError::missing("config/frequency_words.txt");
        assert_eq!(
            err.to_string(),
            "Missing resource: config/frequency_words.txt"
        );
    }

    #[test]
    fn test_malformed_record_display() {
        let err = AppError::malformed("garbage", "empty title");
        assert_eq!(err.to_string(), "Malformed record 'garbage': empty title");
    }
}
