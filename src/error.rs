//! Error handling for ridership processing operations.
//!
//! Configuration errors (the source export changed shape) are fatal for the
//! file being processed. Row-level data problems never surface here; they are
//! dropped and counted in [`crate::models::NormalizationStats`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RidershipError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Raw report not found at path: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Header row starting with '{token}' not found in file: {path}")]
    HeaderNotFound { path: PathBuf, token: String },

    #[error("Column '{column}' for line {line} not found in file: {path}")]
    MissingColumn {
        path: PathBuf,
        column: String,
        line: String,
    },

    #[error(
        "Invalid block layout for line {line}: total column '{total_column}' precedes day column '{day_column}'"
    )]
    InvalidBlockRange {
        line: String,
        day_column: String,
        total_column: String,
    },

    #[error("Invalid target year '{value}': expected a 4-digit calendar year")]
    InvalidYear { value: String },

    #[error("Unknown metro line identifier: {identifier}")]
    UnknownLine { identifier: String },

    #[error("Invalid clean dataset in file: {path} - {reason}")]
    InvalidDataset { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Insufficient data for {test}: {reason}")]
    InsufficientData { test: &'static str, reason: String },

    #[error("Statistics error: {message}")]
    Statistics { message: String },

    #[error("Failed to draw chart {path}: {reason}")]
    Chart { path: PathBuf, reason: String },
}

impl RidershipError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn insufficient_data(test: &'static str, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            test,
            reason: reason.into(),
        }
    }

    /// Whether the error means the source export format changed and a human
    /// must fix the layout before the file can be processed.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::HeaderNotFound { .. }
                | Self::MissingColumn { .. }
                | Self::InvalidBlockRange { .. }
                | Self::InvalidYear { .. }
                | Self::UnknownLine { .. }
                | Self::Configuration { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RidershipError>;
