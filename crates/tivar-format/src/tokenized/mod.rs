//! Token codec.
//!
//! Converts between token bytes and display text using a [`TokenTable`].
//! Decoding prefers two-byte tokens; encoding is greedy longest match over
//! display strings.

mod version;

pub use version::{
    CLOCK_FLAG, CLOCK_TOKENS, VERSION_RANGES, VersionRange, derive_version, is_known_version,
};

use tivar_standards::{Model, TokenSource, TokenTable};

use crate::diagnostics::{DiagnosticCode, Diagnostics, Location, Parsed};
use crate::error::{Result, VarError};

/// Placeholder for bytes with no token.
pub const PLACEHOLDER: char = char::REPLACEMENT_CHARACTER;

/// Token table `source` serves for `model`.
pub fn table_for<'a>(source: &'a dyn TokenSource, model: &Model) -> Result<&'a TokenTable> {
    source
        .table_for(model)
        .ok_or_else(|| VarError::NoTokenTable {
            model: model.name.to_string(),
        })
}

/// Decode token bytes into display text.
///
/// Bytes with no token are rendered as [`PLACEHOLDER`] and reported; the
/// rest of the input is still decoded.
#[must_use]
pub fn decode(tokens: &[u8], table: &TokenTable) -> Parsed<String> {
    let mut text = String::new();
    let mut diagnostics = Diagnostics::new();
    let mut pos = 0;

    while let Some(&byte) = tokens.get(pos) {
        if let Some(display) = tokens.get(pos + 1).and_then(|&page| table.double(byte, page)) {
            text.push_str(display);
            pos += 2;
            continue;
        }
        match table.single(byte) {
            Some(display) => text.push_str(display),
            None => {
                text.push(PLACEHOLDER);
                diagnostics.report(
                    DiagnosticCode::MalformedToken,
                    Location::entry(0, "data").at(pos),
                    format!("expected a token, got byte {byte:02X}"),
                );
            }
        }
        pos += 1;
    }

    Parsed::new(text, diagnostics)
}

/// Encode display text into token bytes.
///
/// At each position the longest display string in `table` that prefixes the
/// remaining text is taken.
pub fn encode(text: &str, table: &TokenTable) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    let mut rest = text;
    let mut position = 0;

    while !rest.is_empty() {
        let ends: Vec<usize> = rest
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take(table.max_display_chars())
            .collect();

        let matched = ends.iter().enumerate().rev().find_map(|(chars, &end)| {
            table
                .encode_display(&rest[..end])
                .map(|bytes| (chars + 1, end, bytes))
        });

        let Some((chars, end, bytes)) = matched else {
            return Err(VarError::unencodable(text, position));
        };
        out.extend_from_slice(bytes);
        position += chars;
        rest = &rest[end..];
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TokenTable {
        TokenTable::new()
            .with(&[0x41], "A")
            .with(&[0x29], " ")
            .with(&[0xDE], "Disp ")
            .with(&[0x44], "D")
            .with(&[0x2A], "\"")
            .with(&[0xBB, 0xB0], "a")
            .with(&[0x5E, 0x80], "u")
            .with(&[0xBB, 0xC5], "u")
    }

    #[test]
    fn test_decode_prefers_two_byte_tokens() {
        let decoded = decode(&[0xDE, 0x2A, 0xBB, 0xB0, 0x41], &table());
        assert_eq!(decoded.value, "Disp \"aA");
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_decode_marks_unknown_bytes() {
        let decoded = decode(&[0x41, 0x07, 0x41], &table());
        assert_eq!(decoded.value, "A\u{FFFD}A");
        let diagnostic = decoded.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.code, DiagnosticCode::MalformedToken);
        assert_eq!(diagnostic.location.offset, Some(1));
    }

    #[test]
    fn test_encode_longest_match() {
        assert_eq!(encode("Disp A", &table()).unwrap(), vec![0xDE, 0x41]);
        assert_eq!(encode("DA", &table()).unwrap(), vec![0x44, 0x41]);
        assert_eq!(encode("", &table()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_encode_uses_first_registered_display() {
        assert_eq!(encode("u", &table()).unwrap(), vec![0x5E, 0x80]);
    }

    #[test]
    fn test_encode_rejects_unknown_text() {
        let err = encode("Disp Aé", &table()).unwrap_err();
        assert!(matches!(err, VarError::UnencodableText { position: 6, .. }));
    }

    struct NoTables;

    impl TokenSource for NoTables {
        fn table_for(&self, _model: &Model) -> Option<&TokenTable> {
            None
        }
    }

    #[test]
    fn test_missing_table() {
        let model = &tivar_standards::models::TI_84PCE;
        assert!(table_for(&tivar_standards::BuiltinTokens, model).is_ok());

        let err = table_for(&NoTables, model).unwrap_err();
        assert!(matches!(err, VarError::NoTokenTable { ref model } if model == "TI-84+CE"));
    }

    #[test]
    fn test_round_trip() {
        let text = "Disp \"a\"";
        let bytes = encode(text, &table()).unwrap();
        assert_eq!(decode(&bytes, &table()).value, text);
    }
}
