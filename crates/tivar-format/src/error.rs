//! Error types for variable file operations.
//!
//! Only conditions that abort an operation are errors. Everything the
//! format tolerates is reported through [`Diagnostics`](crate::Diagnostics)
//! instead.

use thiserror::Error;
use tivar_standards::StandardsError;

use crate::diagnostics::Diagnostics;
use crate::entry::EntryKind;

/// Errors that can occur when reading, writing or editing variable files.
#[derive(Debug, Error)]
pub enum VarError {
    /// Operation not available for this entry.
    #[error("unsupported operation: cannot {operation} ({reason})")]
    UnsupportedOperation {
        operation: &'static str,
        reason: String,
    },

    /// Display text containing a substring outside the token vocabulary.
    #[error("unencodable text at character {position}: {text:?}")]
    UnencodableText { text: String, position: usize },

    /// Type id with no registered entry kind.
    #[error("type id 0x{type_id:02X} is not recognized")]
    UnrecognizedTypeId { type_id: u8 },

    /// Entry requested by position that the file does not contain.
    #[error("entry {index} not found (file has {count} entries)")]
    EntryNotFound { index: usize, count: usize },

    /// Length too large for a 2-byte length field.
    #[error("{field} of {length} bytes does not fit a 2-byte length field")]
    DataTooLarge { field: &'static str, length: usize },

    /// No token table for the active model.
    #[error("no token table available for {model}")]
    NoTokenTable { model: String },

    /// Diagnostics rejected by a strict caller.
    #[error("{} diagnostic(s) rejected: {}", .0.len(), .0.first_message())]
    Rejected(Diagnostics),

    /// Model catalog or token table error.
    #[error(transparent)]
    Standards(#[from] StandardsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for variable file operations.
pub type Result<T> = std::result::Result<T, VarError>;

impl VarError {
    /// Create an UnsupportedOperation error.
    pub fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation,
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedOperation error for text operations on a kind
    /// without tokenized content.
    pub fn not_tokenized(operation: &'static str, kind: EntryKind) -> Self {
        Self::unsupported(operation, format!("{kind} entries hold no tokenized text"))
    }

    /// Create an UnencodableText error.
    pub fn unencodable(text: impl Into<String>, position: usize) -> Self {
        Self::UnencodableText {
            text: text.into(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VarError::unsupported("archive", "entry has no flash bytes");
        assert_eq!(
            err.to_string(),
            "unsupported operation: cannot archive (entry has no flash bytes)"
        );

        let err = VarError::UnrecognizedTypeId { type_id: 0x2A };
        assert_eq!(err.to_string(), "type id 0x2A is not recognized");

        let err = VarError::unencodable("Disp §", 5);
        assert_eq!(err.to_string(), "unencodable text at character 5: \"Disp §\"");

        let err = VarError::DataTooLarge {
            field: "data",
            length: 70_000,
        };
        assert_eq!(
            err.to_string(),
            "data of 70000 bytes does not fit a 2-byte length field"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
        let err: VarError = io_err.into();
        assert!(matches!(err, VarError::Io(_)));
    }
}
