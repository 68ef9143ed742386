//! Token tables.
//!
//! A token table is the closed vocabulary of one calculator generation: a
//! bidirectional mapping between one- or two-byte token codes and the
//! display substrings they stand for. Two-byte tokens start with a prefix
//! byte that selects a secondary page of the vocabulary.

mod loader;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use loader::{load_table_from_path, load_table_from_str};

use crate::embedded;
use crate::models::{Model, TokenSet};

/// Bidirectional token vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    single: HashMap<u8, String>,
    double: HashMap<[u8; 2], String>,
    inverse: HashMap<String, Vec<u8>>,
    max_display_chars: usize,
}

impl TokenTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token.
    ///
    /// Byte sequences longer than two bytes are ignored. Re-inserting a code
    /// replaces its display string; when two codes share a display string the
    /// first one inserted stays the encoding target.
    pub fn insert(&mut self, bytes: &[u8], display: impl Into<String>) {
        let display = display.into();
        match *bytes {
            [byte] => {
                self.single.insert(byte, display.clone());
            }
            [prefix, page] => {
                self.double.insert([prefix, page], display.clone());
            }
            _ => return,
        }
        self.max_display_chars = self.max_display_chars.max(display.chars().count());
        self.inverse.entry(display).or_insert_with(|| bytes.to_vec());
    }

    /// Builder-style [`TokenTable::insert`].
    #[must_use]
    pub fn with(mut self, bytes: &[u8], display: impl Into<String>) -> Self {
        self.insert(bytes, display);
        self
    }

    /// Layer another table on top of this one.
    ///
    /// Codes from `other` override codes already present; display strings
    /// already present keep their original encoding.
    pub fn merge(&mut self, other: &TokenTable) {
        for (byte, display) in sorted(&other.single, |b| vec![*b]) {
            self.insert(&[*byte], display.clone());
        }
        for (code, display) in sorted(&other.double, |c| c.to_vec()) {
            self.insert(code, display.clone());
        }
    }

    /// Display string of a one-byte token.
    #[must_use]
    pub fn single(&self, byte: u8) -> Option<&str> {
        self.single.get(&byte).map(String::as_str)
    }

    /// Display string of a two-byte token.
    #[must_use]
    pub fn double(&self, prefix: u8, page: u8) -> Option<&str> {
        self.double.get(&[prefix, page]).map(String::as_str)
    }

    /// Token bytes for an exact display string.
    #[must_use]
    pub fn encode_display(&self, display: &str) -> Option<&[u8]> {
        self.inverse.get(display).map(Vec::as_slice)
    }

    /// Length in characters of the longest display string.
    #[must_use]
    pub fn max_display_chars(&self) -> usize {
        self.max_display_chars
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.single.len() + self.double.len()
    }

    /// Whether the table has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All display strings, in no particular order.
    pub fn displays(&self) -> impl Iterator<Item = &str> {
        self.inverse.keys().map(String::as_str)
    }
}

/// Iterate a map in key order so merges are deterministic.
fn sorted<K, V>(map: &HashMap<K, V>, key: impl Fn(&K) -> Vec<u8>) -> Vec<(&K, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(k, _)| key(k));
    entries
}

/// A source of token tables, keyed by model.
pub trait TokenSource {
    /// Token table for a model, if one is known.
    fn table_for(&self, model: &Model) -> Option<&TokenTable>;
}

/// Token tables compiled into this crate.
///
/// Each table layers the embedded CSV files of its generation:
///
/// | Token set | Layers                       |
/// |-----------|------------------------------|
/// | TI-82     | core                         |
/// | TI-83     | core, ti84                   |
/// | CSE       | core, ti84, color            |
/// | CE        | core, ti84, color, ce        |
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTokens;

impl BuiltinTokens {
    /// Table for a token set.
    #[must_use]
    pub fn table(self, set: TokenSet) -> &'static TokenTable {
        let tables = BUILTIN_TABLES.get_or_init(build_builtin_tables);
        &tables[TokenSet::ALL
            .iter()
            .position(|s| *s == set)
            .unwrap_or_default()]
    }
}

impl TokenSource for BuiltinTokens {
    fn table_for(&self, model: &Model) -> Option<&TokenTable> {
        Some(self.table(model.token_set))
    }
}

/// A single table used for every model.
impl TokenSource for TokenTable {
    fn table_for(&self, _model: &Model) -> Option<&TokenTable> {
        Some(self)
    }
}

static BUILTIN_TABLES: OnceLock<Vec<TokenTable>> = OnceLock::new();

fn build_builtin_tables() -> Vec<TokenTable> {
    TokenSet::ALL
        .iter()
        .map(|set| {
            let mut table = TokenTable::new();
            for (name, content) in embedded::token_layers(*set) {
                // Embedded data is checked by the crate's tests.
                match load_table_from_str(content, name) {
                    Ok(layer) => table.merge(&layer),
                    Err(error) => tracing::error!(%error, "embedded token layer rejected"),
                }
            }
            table
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let table = TokenTable::new()
            .with(&[0x41], "A")
            .with(&[0xBB, 0xB0], "a")
            .with(&[0xDE], "Disp ");

        assert_eq!(table.single(0x41), Some("A"));
        assert_eq!(table.double(0xBB, 0xB0), Some("a"));
        assert_eq!(table.encode_display("Disp "), Some(&[0xDE][..]));
        assert_eq!(table.max_display_chars(), 5);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_first_display_wins() {
        let table = TokenTable::new()
            .with(&[0x5E, 0x80], "u")
            .with(&[0xBB, 0xC5], "u");

        assert_eq!(table.encode_display("u"), Some(&[0x5E, 0x80][..]));
        assert_eq!(table.double(0xBB, 0xC5), Some("u"));
    }

    #[test]
    fn test_merge_overrides_codes() {
        let mut base = TokenTable::new().with(&[0x41], "A").with(&[0x42], "B");
        let overlay = TokenTable::new().with(&[0x42], "b").with(&[0xEF, 0x97], "toString(");
        base.merge(&overlay);

        assert_eq!(base.single(0x42), Some("b"));
        assert_eq!(base.double(0xEF, 0x97), Some("toString("));
        assert_eq!(base.encode_display("B"), Some(&[0x42][..]));
    }

    #[test]
    fn test_builtin_tables_grow() {
        let ti82 = BuiltinTokens.table(TokenSet::Ti82);
        let ti83 = BuiltinTokens.table(TokenSet::Ti83);
        let ce = BuiltinTokens.table(TokenSet::Ce);

        assert!(!ti82.is_empty());
        assert!(ti83.len() > ti82.len());
        assert!(ce.len() > ti83.len());
        assert_eq!(ce.single(0xDE), Some("Disp "));
        assert_eq!(ce.double(0xEF, 0x97), Some("toString("));
        assert_eq!(ti82.double(0xEF, 0x97), None);
    }
}
