//! Structured error types for loading and parsing an export.
//!
//! Only whole-run failures are errors. Problems with a single variable
//! degrade into empty facets or sentinel chain nodes instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineageError {
    #[error("Export not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid export {}: {source}", path.display())]
    InvalidExport {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Invalid extraction pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl LineageError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = LineageError> = std::result::Result<T, E>;
