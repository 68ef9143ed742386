//! Token table loading from CSV.
//!
//! # CSV Structure
//!
//! | Column    | Example | Description                                 |
//! |-----------|---------|---------------------------------------------|
//! | `bytes`   | `BB B0` | One or two hex bytes, separators optional   |
//! | `display` | `a`     | Display substring, quoted when it needs to  |

use std::io::Cursor;
use std::path::Path;

use serde::Deserialize;

use super::TokenTable;
use crate::error::{Result, StandardsError};

#[derive(Debug, Deserialize)]
struct TokenRow {
    bytes: String,
    display: String,
}

/// Load a token table from CSV string content.
///
/// `source_name` is only used in error messages.
pub fn load_table_from_str(content: &str, source_name: &str) -> Result<TokenTable> {
    let cursor = Cursor::new(content.as_bytes());
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(cursor);

    let csv_error = |source| StandardsError::CsvRead {
        source_name: source_name.to_string(),
        source,
    };
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut table = TokenTable::new();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_error)? {
        let row: TokenRow = record.deserialize(Some(&headers)).map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        let bytes = parse_token_bytes(&row.bytes).ok_or_else(|| {
            StandardsError::InvalidTokenBytes {
                value: row.bytes.clone(),
                source_name: source_name.to_string(),
                line,
            }
        })?;
        if row.display.is_empty() {
            return Err(StandardsError::EmptyDisplay {
                bytes: row.bytes,
                source_name: source_name.to_string(),
            });
        }
        table.insert(&bytes, row.display);
    }

    tracing::debug!(source = source_name, tokens = table.len(), "loaded token table");
    Ok(table)
}

/// Load a token table from a CSV file.
pub fn load_table_from_path(path: &Path) -> Result<TokenTable> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StandardsError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StandardsError::Io(e)
        }
    })?;
    load_table_from_str(&content, &path.display().to_string())
}

/// Parse `"BB B0"`, `"BBB0"` or `"3E"` into token bytes.
fn parse_token_bytes(value: &str) -> Option<Vec<u8>> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    let compact = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    let bytes = hex::decode(compact).ok()?;
    matches!(bytes.len(), 1 | 2).then_some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_bytes() {
        assert_eq!(parse_token_bytes("3E"), Some(vec![0x3E]));
        assert_eq!(parse_token_bytes("BB B0"), Some(vec![0xBB, 0xB0]));
        assert_eq!(parse_token_bytes("0xEF97"), Some(vec![0xEF, 0x97]));
        assert_eq!(parse_token_bytes("EF 97 00"), None);
        assert_eq!(parse_token_bytes("ZZ"), None);
        assert_eq!(parse_token_bytes(""), None);
    }

    #[test]
    fn test_load_quoted_display() {
        let csv = "bytes,display\n29,\" \"\n2B,\",\"\n2A,\"\"\"\"\n3F,\"\n\"\n";
        let table = load_table_from_str(csv, "inline").unwrap();

        assert_eq!(table.single(0x29), Some(" "));
        assert_eq!(table.single(0x2B), Some(","));
        assert_eq!(table.single(0x2A), Some("\""));
        assert_eq!(table.single(0x3F), Some("\n"));
    }

    #[test]
    fn test_load_rejects_bad_bytes() {
        let csv = "bytes,display\nXYZ,A\n";
        let err = load_table_from_str(csv, "bad.csv").unwrap_err();
        assert!(matches!(err, StandardsError::InvalidTokenBytes { .. }));
        assert!(err.to_string().contains("bad.csv"));
    }

    #[test]
    fn test_load_rejects_empty_display() {
        let csv = "bytes,display\n41,\n";
        let err = load_table_from_str(csv, "empty.csv").unwrap_err();
        assert!(matches!(err, StandardsError::EmptyDisplay { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_table_from_path(Path::new("/nonexistent/tokens.csv")).unwrap_err();
        assert!(matches!(err, StandardsError::FileNotFound { .. }));
    }
}
