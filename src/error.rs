//! Error types shared by the ingestion, rendering and export stages.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a dispatch run.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Workbook could not be opened or a sheet could not be read
    #[error("Spreadsheet error in {}: {message}", path.display())]
    Workbook { path: PathBuf, message: String },

    /// Input file with an extension we do not read
    #[error("Unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PDF assembly error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Font program could not be loaded or parsed
    #[error("Font error: {0}")]
    Font(String),

    /// Unknown IANA timezone name
    #[error("Unknown timezone: {0}")]
    Timezone(String),

    /// The city reference table lists a city under more than one region
    #[error("City '{city}' is listed under both '{first}' and '{second}'")]
    DuplicateCity {
        city: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

impl DispatchError {
    pub(crate) fn workbook(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Workbook {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
