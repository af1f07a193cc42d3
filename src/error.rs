// src/error.rs

//! Unified error handling for the sync application.
//!
//! `Upload` and `EmptyBatch` only come out of the downstream client and are
//! absorbed by the station pipeline. Everything else reaches the caller.

use std::fmt;

use thiserror::Error;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Station code missing from the `codigos` mapping
    #[error("Unknown station code '{0}': not present in configuration")]
    UnknownStation(String),

    /// Read API answered with a non-success status
    #[error("Upstream request to {url} failed with status {status}")]
    Upstream { status: u16, url: String },

    /// Write API rejected or failed a batch
    #[error("Upload error for series {series_id}: {message}")]
    Upload { series_id: i64, message: String },

    /// Upload attempted with no observations
    #[error("Refusing to upload an empty observation batch for series {0}")]
    EmptyBatch(i64),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Date argument could not be parsed
    #[error("Invalid date '{input}': {message}")]
    InvalidDate { input: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an upload error for a series.
    pub fn upload(series_id: i64, message: impl fmt::Display) -> Self {
        Self::Upload {
            series_id,
            message: message.to_string(),
        }
    }

    /// Create a date parsing error.
    pub fn invalid_date(input: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::InvalidDate {
            input: input.into(),
            message: message.to_string(),
        }
    }
}
