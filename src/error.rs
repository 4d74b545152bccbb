//! Error types for chart generation.

use std::path::PathBuf;

use thiserror::Error;

/// Every failure is fatal for the current invocation; nothing is retried.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Column resolution failed for '{pattern}': {reason}")]
    ColumnResolution { pattern: String, reason: String },

    #[error("Invalid column pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Sample id '{id}' is malformed: {reason}")]
    SampleIdFormat { id: String, reason: String },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChartError {
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        ChartError::Render(err.to_string())
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ChartError>;
