//! Error types for catalog and token table loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading models or token tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    /// Token table file not found.
    #[error("token table not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read or parse a token CSV.
    #[error("failed to read token table {source_name}: {source}")]
    CsvRead {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// A token row whose byte column is not one or two hex bytes.
    #[error("invalid token bytes '{value}' in {source_name} (line {line})")]
    InvalidTokenBytes {
        value: String,
        source_name: String,
        line: u64,
    },

    /// A token row with an empty display string.
    #[error("empty display string for token {bytes} in {source_name}")]
    EmptyDisplay { bytes: String, source_name: String },

    /// Model name that is not in the catalog.
    #[error("unknown model: {name}")]
    UnknownModel { name: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for catalog and token table operations.
pub type Result<T> = std::result::Result<T, StandardsError>;
