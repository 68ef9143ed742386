//! Length-prefixed data sections and tokenized text.
//!
//! Sized kinds store `[length: u16 LE][payload]` in their data section. For
//! tokenized kinds the payload is token bytes.

use std::io::Read;

use tivar_standards::TokenTable;

use super::{Entry, EntryKind};
use crate::cursor::length_field;
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location, Parsed};
use crate::error::{Result, VarError};
use crate::tokenized;

impl Entry {
    /// Length recorded at the start of a sized data section.
    #[must_use]
    pub fn declared_length(&self) -> Option<u16> {
        match *self.data.as_slice() {
            [lo, hi, ..] if self.kind.is_sized() => Some(u16::from_le_bytes([lo, hi])),
            _ => None,
        }
    }

    /// Data after the length prefix; the whole data section for unsized kinds.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        if self.kind.is_sized() {
            self.data.get(2..).unwrap_or_default()
        } else {
            &self.data
        }
    }

    /// Replace the payload, rewriting the length prefix to match.
    ///
    /// Fails with [`VarError::DataTooLarge`] if the payload or the data
    /// section would not fit their length fields; the entry is unchanged.
    pub fn set_payload(&mut self, payload: &[u8]) -> Result<()> {
        if self.kind.is_sized() {
            let prefix = length_field("payload", payload.len())?;
            let mut data = Vec::with_capacity(payload.len() + 2);
            data.extend_from_slice(&prefix);
            data.extend_from_slice(payload);
            self.set_data(data)
        } else {
            self.set_data(payload)
        }
    }

    /// Read a sized data section from a stream.
    ///
    /// Reads a 2-byte length, then that many bytes. The freshly read length
    /// wins over the length the entry previously declared; a disagreement or
    /// a short read is reported.
    pub fn load_data<R: Read>(&mut self, reader: &mut R) -> Result<Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut prefix = [0u8; 2];
        reader.read_exact(&mut prefix)?;
        let length = usize::from(u16::from_le_bytes(prefix));

        let declared = self.data.len().saturating_sub(2);
        if declared != length {
            diagnostics.report(
                DiagnosticCode::SizedLengthMismatch,
                Location::entry(0, "data").at(0),
                format!("expected {declared} byte(s) from the entry, got length {length}; using {length}"),
            );
        }

        let mut payload = Vec::with_capacity(length);
        reader.take(length as u64).read_to_end(&mut payload)?;
        if payload.len() < length {
            diagnostics.report(
                DiagnosticCode::Truncated,
                Location::entry(0, "data").at(2 + payload.len()),
                format!("expected {length} byte(s) of data, got {}", payload.len()),
            );
        }

        let mut data = prefix.to_vec();
        data.extend_from_slice(&payload);
        self.data = data;
        Ok(diagnostics)
    }

    pub(super) fn check_sized_length(&self, diagnostics: &mut Diagnostics) {
        if self.data.is_empty() {
            return;
        }
        let actual = self.payload().len();
        match self.declared_length() {
            Some(declared) if usize::from(declared) == actual => {}
            declared => diagnostics.report(
                DiagnosticCode::SizedLengthMismatch,
                Location::entry(0, "data").at(0),
                format!(
                    "expected length prefix {actual}, got {}",
                    declared.map_or_else(|| "none".to_string(), |d| d.to_string())
                ),
            ),
        }
    }

    /// Minimum version needed to display the payload's tokens.
    #[must_use]
    pub fn derive_version(&self) -> u8 {
        tokenized::derive_version(self.payload())
    }

    /// Decode the payload's tokens.
    pub fn decode(&self, table: &TokenTable) -> Result<Parsed<String>> {
        self.require_tokenized("decode")?;
        let (text, found) = tokenized::decode(self.payload(), table).into_parts();
        let mut diagnostics = Diagnostics::new();
        for mut diagnostic in found {
            // Shift token offsets past the length prefix.
            diagnostic.location.offset = diagnostic.location.offset.map(|o| o + 2);
            diagnostics.push(diagnostic);
        }
        Ok(Parsed::new(text, diagnostics))
    }

    /// Display form of the entry's text.
    ///
    /// Strings are shown in quotation marks.
    pub fn string(&self, table: &TokenTable) -> Result<Parsed<String>> {
        let parsed = self.decode(table)?;
        Ok(match self.kind {
            EntryKind::String => parsed.map(|text| format!("\"{text}\"")),
            _ => parsed,
        })
    }

    /// Replace the entry's text, recomputing its version.
    ///
    /// Strings may be given in their quoted display form; one matching pair
    /// of `"` or `'` is stripped.
    pub fn load_string(&mut self, text: &str, table: &TokenTable) -> Result<()> {
        self.require_tokenized("load text into")?;
        let text = match self.kind {
            EntryKind::String => strip_quotes(text),
            _ => text,
        };
        let tokens = tokenized::encode(text, table)?;
        self.set_payload(&tokens)?;
        self.set_version(tokenized::derive_version(&tokens));
        Ok(())
    }

    fn require_tokenized(&self, operation: &'static str) -> Result<()> {
        if self.kind.is_tokenized() {
            Ok(())
        } else {
            Err(VarError::not_tokenized(operation, self.kind))
        }
    }
}

fn strip_quotes(text: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|q| text.strip_prefix(*q).and_then(|t| t.strip_suffix(*q)))
        .unwrap_or(text)
}
