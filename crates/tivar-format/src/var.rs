//! The variable file container.
//!
//! A file is a header, a 2-byte total entry length, the entries themselves
//! and a 2-byte checksum over the entry bytes.

use tivar_standards::{BuiltinCatalog, Model};

use crate::cursor::{ByteCursor, length_field};
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location, Parsed, Section};
use crate::entry::Entry;
use crate::error::{Result, VarError};
use crate::header::{HEADER_LEN, Header};
use crate::options::ReadOptions;

/// Sum of all entry bytes, modulo 65536.
#[must_use]
pub fn checksum<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> u16 {
    let sum = entries
        .into_iter()
        .flat_map(Entry::bytes)
        .fold(0u32, |acc, byte| acc.wrapping_add(u32::from(byte)));
    (sum & 0xFFFF) as u16
}

/// A variable file.
///
/// Equality compares headers and entries.
#[derive(Debug, Clone, Default)]
pub struct TiVar {
    header: Header,
    entries: Vec<Entry>,
    model: Option<&'static Model>,
}

impl PartialEq for TiVar {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.entries == other.entries
    }
}

impl Eq for TiVar {}

impl TiVar {
    /// Create an empty container.
    ///
    /// A `model` that differs from the one the header names is reported.
    #[must_use]
    pub fn new(header: Header, model: Option<&'static Model>) -> Parsed<TiVar> {
        let mut diagnostics = Diagnostics::new();
        if let Some(model) = model {
            let derived = header.derive_model(&BuiltinCatalog).value;
            check_model(model, &header, derived, &mut diagnostics);
        }
        let var = TiVar {
            header,
            entries: Vec::new(),
            model,
        };
        Parsed::new(var, diagnostics)
    }

    /// Empty container with a default header for `model`.
    #[must_use]
    pub fn for_model(model: &'static Model) -> TiVar {
        TiVar {
            header: Header::for_model(model),
            entries: Vec::new(),
            model: Some(model),
        }
    }

    /// Parse a whole file.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Parsed<TiVar> {
        Self::parse(bytes, None)
    }

    /// Parse a whole file, applying `options`.
    ///
    /// In strict mode any warning fails the load with
    /// [`VarError::Rejected`].
    pub fn load(bytes: &[u8], options: &ReadOptions) -> Result<Parsed<TiVar>> {
        let parsed = Self::parse(bytes, options.expected_model);
        if options.strict && parsed.diagnostics.warning_count() > 0 {
            return Err(VarError::Rejected(parsed.diagnostics));
        }
        Ok(parsed)
    }

    fn parse(bytes: &[u8], expected: Option<&'static Model>) -> Parsed<TiVar> {
        let mut diagnostics = Diagnostics::new();

        let mut cursor = ByteCursor::new(bytes, Section::Header);
        let header = Header::read(&mut cursor, &mut diagnostics);
        let mut cursor = ByteCursor::new(&bytes[HEADER_LEN.min(bytes.len())..], Section::Container);
        let mut remaining = usize::from(cursor.u16_le("entry_length", &mut diagnostics));

        let mut var = TiVar {
            header,
            entries: Vec::new(),
            model: expected,
        };

        let mut truncated = false;
        while remaining > 0 {
            let index = var.entries.len();
            let Some(length) = Entry::peek_length(cursor.rest()).filter(|l| *l <= cursor.rest().len())
            else {
                diagnostics.report(
                    DiagnosticCode::Truncated,
                    cursor.location("entries"),
                    format!("expected {remaining} more entry byte(s), got {}", cursor.rest().len()),
                );
                truncated = true;
                break;
            };
            tracing::trace!(index, offset = HEADER_LEN + cursor.position(), length, "entry");

            let raw = cursor.take(length, "entries", &mut diagnostics);
            let (entry, found) = Entry::from_bytes(raw).into_parts();
            diagnostics.extend_for_entry(index, found);
            diagnostics.extend(var.add_entry(entry));
            remaining = remaining.saturating_sub(length);
        }

        if truncated {
            tracing::debug!("checksum not checked after truncated entries");
        } else if cursor.rest().len() < 2 {
            diagnostics.report(
                DiagnosticCode::Truncated,
                Location::checksum(),
                "expected a 2-byte checksum, got end of input",
            );
        } else {
            let stored = cursor.u16_le("checksum", &mut diagnostics);
            let computed = var.checksum();
            if stored != computed {
                diagnostics.report(
                    DiagnosticCode::ChecksumMismatch,
                    Location::checksum(),
                    format!("expected {computed:04X}, got {stored:04X}"),
                );
            }
        }

        let (derived, found) = var.header.derive_model(&BuiltinCatalog).into_parts();
        diagnostics.extend(found);
        match expected {
            Some(model) => check_model(model, &var.header, derived, &mut diagnostics),
            None => var.model = derived,
        }

        Parsed::new(var, diagnostics)
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    /// Model of the file: the expected model if one was given, otherwise the
    /// model derived from the header.
    #[must_use]
    pub fn model(&self) -> Option<&'static Model> {
        self.model
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry.
    ///
    /// Entries of one file should share a meta length; a mismatch is
    /// reported but the entry is still added.
    pub fn add_entry(&mut self, entry: Entry) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if let Some(first) = self.entries.first()
            && first.meta_length() != entry.meta_length()
        {
            diagnostics.report(
                DiagnosticCode::MixedMetaLength,
                Location::entry(self.entries.len(), "meta_length"),
                format!(
                    "expected {} like the first entry, got {}",
                    first.meta_length(),
                    entry.meta_length()
                ),
            );
        }
        self.entries.push(entry);
        diagnostics
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Total serialized length of the entries.
    #[must_use]
    pub fn entry_length(&self) -> usize {
        self.entries.iter().map(Entry::length).sum()
    }

    #[must_use]
    pub fn checksum(&self) -> u16 {
        checksum(&self.entries)
    }

    /// Serialized file length.
    #[must_use]
    pub fn length(&self) -> usize {
        HEADER_LEN + 2 + self.entry_length() + 2
    }

    /// Serialize the file, failing if the entries or any data section
    /// overflow their 2-byte length fields.
    pub fn try_bytes(&self) -> Result<Vec<u8>> {
        let entry_length = length_field("entry_length", self.entry_length())?;
        let entries = self
            .entries
            .iter()
            .map(Entry::try_bytes)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.assemble(entry_length, entries))
    }

    /// Serialize the file.
    ///
    /// Length fields saturate on overflow; writers use
    /// [`TiVar::try_bytes`].
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let entry_length = u16::try_from(self.entry_length()).unwrap_or(u16::MAX);
        let entries = self.entries.iter().map(Entry::bytes).collect();
        self.assemble(entry_length.to_le_bytes(), entries)
    }

    fn assemble(&self, entry_length: [u8; 2], entries: Vec<Vec<u8>>) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        out.extend_from_slice(&self.header.bytes());
        out.extend_from_slice(&entry_length);
        for entry in &entries {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(&self.checksum().to_le_bytes());
        out
    }

    /// Default file extension.
    ///
    /// Files with anything other than exactly one entry are groups (`8xg`).
    #[must_use]
    pub fn extension(&self) -> Parsed<String> {
        match self.entries.as_slice() {
            [entry] => entry.extension(self.model),
            _ => Parsed::new("8xg".to_string(), Diagnostics::new()),
        }
    }
}

/// Read the entry at `index` without parsing the others.
///
/// Skips the header, the entry length field and the preceding entries by
/// their length fields.
pub fn load_entry_at(bytes: &[u8], index: usize) -> Result<Parsed<Entry>> {
    let mut offset = HEADER_LEN + 2;
    let mut count = 0;
    loop {
        let rest = bytes.get(offset..).unwrap_or_default();
        let Some(length) = Entry::peek_length(rest).filter(|l| *l <= rest.len()) else {
            return Err(VarError::EntryNotFound { index, count });
        };
        if count == index {
            let mut parsed = Entry::from_bytes(&rest[..length]);
            relocate(&mut parsed.diagnostics, index);
            return Ok(parsed);
        }
        offset += length;
        count += 1;
    }
}

/// Read the first entry of a file.
///
/// Entries after the first are reported and ignored.
pub fn load_single_entry(bytes: &[u8]) -> Result<Parsed<Entry>> {
    let mut parsed = load_entry_at(bytes, 0)?;
    let declared = bytes
        .get(HEADER_LEN..HEADER_LEN + 2)
        .map_or(0, |b| usize::from(u16::from_le_bytes([b[0], b[1]])));
    let first = parsed.value.length();
    if declared > first {
        parsed.diagnostics.report(
            DiagnosticCode::MultipleEntries,
            Location::container("entries"),
            format!(
                "expected 1 entry ({first} bytes), got {declared} entry bytes; only the first was read"
            ),
        );
    }
    Ok(parsed)
}

/// A header agrees with a model if it derives to it, or if it carries the
/// model's own signature and product id (several models share those).
fn check_model(
    expected: &Model,
    header: &Header,
    derived: Option<&'static Model>,
    diagnostics: &mut Diagnostics,
) {
    let same_ids = header.signature() == Some(expected.signature)
        && header.product_id() == expected.product_id;
    if derived != Some(expected) && !same_ids {
        diagnostics.report(
            DiagnosticCode::ModelMismatch,
            Location::header("magic"),
            format!(
                "expected {expected}, got {}",
                derived.map_or("an unknown model", |m| m.name)
            ),
        );
    }
}

fn relocate(diagnostics: &mut Diagnostics, index: usize) {
    let found = std::mem::take(diagnostics);
    diagnostics.extend_for_entry(index, found);
}
