//! Error handling for order ingestion operations.
//!
//! Fatal errors only. Malformed order lines never surface here: the line
//! transform resolves them to a skip (see [`crate::models::SkipReason`]).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrdersError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input is not valid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

pub type Result<T> = std::result::Result<T, OrdersError>;
