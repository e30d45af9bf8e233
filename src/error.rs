// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse failure category of a run.
///
/// None of these stop a run; the pipeline logs them and degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SourceUnavailable,
    StoreCorrupt,
    NotifyFailed,
    ConfigMissing,
    Other,
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
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

    /// CSV parsing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A listing source could not be fetched or parsed as a whole
    #[error("Source '{source_name}' unavailable: {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    /// A state or rule file exists but cannot be read
    #[error("Corrupt file {path}: {message}")]
    StoreCorrupt { path: String, message: String },

    /// Notification delivery failed
    #[error("Notification failed: {0}")]
    NotifyFailed(String),

    /// A required input file is absent
    #[error("Missing file: {0}")]
    ConfigMissing(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
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

    /// Create a source failure for the named source.
    pub fn source_unavailable(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create a corrupt-file error.
    pub fn store_corrupt(path: &Path, message: impl fmt::Display) -> Self {
        Self::StoreCorrupt {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a delivery failure.
    pub fn notify_failed(message: impl fmt::Display) -> Self {
        Self::NotifyFailed(message.to_string())
    }

    /// Create a missing-file error.
    pub fn config_missing(path: &Path) -> Self {
        Self::ConfigMissing(path.display().to_string())
    }

    /// Category used by the pipeline when deciding how to degrade.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SourceUnavailable { .. }
            | Self::Http(_)
            | Self::Csv(_)
            | Self::Selector { .. } => FailureKind::SourceUnavailable,
            Self::StoreCorrupt { .. } | Self::Json(_) => FailureKind::StoreCorrupt,
            Self::NotifyFailed(_) => FailureKind::NotifyFailed,
            Self::ConfigMissing(_) => FailureKind::ConfigMissing,
            _ => FailureKind::Other,
        }
    }
}
