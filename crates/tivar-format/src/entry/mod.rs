//! Variable entries.
//!
//! # On-disk layout
//!
//! | Field         | Size | Notes                                 |
//! |---------------|------|---------------------------------------|
//! | meta length   | 2    | 13 (flash) or 11 (flashless)          |
//! | data length   | 2    |                                       |
//! | type id       | 1    | selects the [`EntryKind`]             |
//! | name          | 8    | interpreted per kind                  |
//! | version       | 1    | flash layout only                     |
//! | archived      | 1    | flash layout only, `80` means archived|
//! | data length   | 2    | repeated; authoritative on read       |
//! | data          | n    |                                       |

mod kind;
mod name;
mod sized;

pub use kind::{EntryKind, GENERIC_TYPE_ID, KindSpec};
pub use name::NAME_LEN;

use tivar_standards::Model;

use crate::cursor::{ByteCursor, length_field};
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location, Parsed, Section};
use crate::error::{Result, VarError};
use crate::header::Header;
use crate::options::EntryOptions;
use crate::tokenized::{derive_version, is_known_version};
use crate::var::TiVar;

/// Meta length of flashless entries.
pub const BASE_META_LENGTH: u16 = 11;

/// Meta length of entries carrying version and archived bytes.
pub const FLASH_META_LENGTH: u16 = 13;

/// Archived byte value meaning "archived".
pub const ARCHIVED: u8 = 0x80;

/// A single variable record.
///
/// Equality compares the serialized fields only.
#[derive(Debug, Clone)]
pub struct Entry {
    kind: EntryKind,
    meta_length: u16,
    type_id: u8,
    name: [u8; NAME_LEN],
    version: u8,
    archived: u8,
    data: Vec<u8>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.meta_length == other.meta_length
            && self.type_id == other.type_id
            && self.name == other.name
            && self.flash_bytes() == other.flash_bytes()
            && self.data == other.data
    }
}

impl Eq for Entry {}

impl Entry {
    /// Create an entry of `kind`.
    ///
    /// Version or archived values given for the flashless layout have
    /// nowhere to go on disk; they are dropped and reported.
    #[must_use]
    pub fn new(kind: EntryKind, options: EntryOptions) -> Parsed<Entry> {
        let mut diagnostics = Diagnostics::new();
        let spec = kind.spec();

        let name = options.name.as_deref().unwrap_or(spec.default_name);
        let name = name::encode_name(kind, name, &mut diagnostics);

        let (meta_length, version, archived) = if options.for_flash {
            let archived = if options.archived == Some(true) { ARCHIVED } else { 0 };
            (FLASH_META_LENGTH, options.version.unwrap_or(0), archived)
        } else {
            if options.version.is_some() || options.archived.is_some() {
                diagnostics.report(
                    DiagnosticCode::FlashlessFlashFields,
                    Location::entry(0, "flash_bytes"),
                    "expected no version or archived flag for a flashless entry; values dropped",
                );
            }
            (BASE_META_LENGTH, 0, 0)
        };

        let mut data = options.data.unwrap_or_default();
        if data.len() < spec.min_data_length {
            data.resize(spec.min_data_length, 0);
        }

        let entry = Entry {
            kind,
            meta_length,
            type_id: kind.type_id(),
            name,
            version,
            archived,
            data,
        };
        Parsed::new(entry, diagnostics)
    }

    /// Parse one entry, coercing it to the kind registered for its type id.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Parsed<Entry> {
        Self::load_as(EntryKind::Generic, bytes)
    }

    /// Parse one entry expected to be of `expected` kind.
    ///
    /// A different type id is reported, then coercion proceeds as usual.
    #[must_use]
    pub fn load_as(expected: EntryKind, bytes: &[u8]) -> Parsed<Entry> {
        let mut diagnostics = Diagnostics::new();
        let mut cursor = ByteCursor::new(bytes, Section::Entry(0));

        let meta_length = cursor.u16_le("meta_length", &mut diagnostics);
        let data_length = cursor.u16_le("data_length", &mut diagnostics);

        let type_location = cursor.location("type_id");
        let type_id = cursor.u8("type_id", &mut diagnostics);
        if expected != EntryKind::Generic && type_id != expected.type_id() {
            let actual = EntryKind::from_type_id(type_id)
                .map_or_else(|| "an unknown kind".to_string(), |k| k.to_string());
            diagnostics.report(
                DiagnosticCode::TypeMismatch,
                type_location,
                format!(
                    "expected {expected} (type id {:02X}), got {actual} (type id {type_id:02X})",
                    expected.type_id()
                ),
            );
        }

        let name = cursor.array::<NAME_LEN>("name", &mut diagnostics);

        let (version, archived) = if meta_length == BASE_META_LENGTH {
            (0, 0)
        } else {
            if meta_length != FLASH_META_LENGTH {
                diagnostics.report(
                    DiagnosticCode::MetaLength,
                    Location::entry(0, "meta_length").at(0),
                    format!(
                        "expected {BASE_META_LENGTH} or {FLASH_META_LENGTH}, got {meta_length}; reading flash bytes anyway"
                    ),
                );
            }
            let version = cursor.u8("version", &mut diagnostics);
            let archived_location = cursor.location("archived");
            let archived = cursor.u8("archived", &mut diagnostics);
            if archived != 0 && archived != ARCHIVED {
                diagnostics.report(
                    DiagnosticCode::ArchivedFlag,
                    archived_location,
                    format!("expected 00 or 80, got {archived:02X}"),
                );
            }
            (version, archived)
        };

        let repeat_location = cursor.location("data_length");
        let repeated = cursor.u16_le("data_length", &mut diagnostics);
        if repeated != data_length {
            diagnostics.report(
                DiagnosticCode::DataLengthMismatch,
                repeat_location,
                format!("expected {data_length} to match the first length field, got {repeated}; using {repeated}"),
            );
        }
        let data = cursor.take(repeated.into(), "data", &mut diagnostics).to_vec();

        let raw = Entry {
            kind: expected,
            meta_length,
            type_id,
            name,
            version,
            archived,
            data,
        };
        tracing::trace!(type_id, length = raw.length(), "read entry");

        let entry = match raw.coerce() {
            Ok(entry) => entry,
            Err(error) => {
                diagnostics.report(
                    DiagnosticCode::UnknownTypeId,
                    Location::entry(0, "type_id").at(4),
                    format!("{error}; entry left as {}", raw.kind),
                );
                raw
            }
        };
        entry.check_contents(&mut diagnostics);
        Parsed::new(entry, diagnostics)
    }

    /// On-disk length of the entry at the start of `bytes`.
    ///
    /// `None` if fewer than four bytes remain. An unexpected meta length
    /// counts as the flash layout it is read with.
    #[must_use]
    pub fn peek_length(bytes: &[u8]) -> Option<usize> {
        match *bytes {
            [m0, m1, d0, d1, ..] => Some(
                2 + layout_meta_length(u16::from_le_bytes([m0, m1]))
                    + 2
                    + usize::from(u16::from_le_bytes([d0, d1])),
            ),
            _ => None,
        }
    }

    /// Promote the entry to the kind registered for its type id.
    ///
    /// A concrete entry whose type id matches its kind is returned as is.
    /// A generic entry with an unregistered type id is an error; a concrete
    /// entry is never demoted.
    pub fn coerce(&self) -> Result<Entry> {
        match EntryKind::from_type_id(self.type_id) {
            Some(kind) => {
                if kind != self.kind {
                    tracing::debug!(from = %self.kind, to = %kind, "coerced entry");
                }
                Ok(Entry {
                    kind,
                    ..self.clone()
                })
            }
            None if self.kind != EntryKind::Generic => Ok(self.clone()),
            None => Err(VarError::UnrecognizedTypeId {
                type_id: self.type_id,
            }),
        }
    }

    /// Kind-specific checks run after loading.
    fn check_contents(&self, diagnostics: &mut Diagnostics) {
        if self.kind.is_sized() {
            self.check_sized_length(diagnostics);
        }
        if !self.kind.is_tokenized() || !self.has_flash_bytes() {
            return;
        }
        if !is_known_version(self.version) {
            diagnostics.report(
                DiagnosticCode::UnknownVersion,
                Location::entry(0, "version"),
                format!(
                    "expected a known {} version, got {:02X}",
                    self.kind, self.version
                ),
            );
        }
        let derived = derive_version(self.payload());
        if self.version != derived {
            diagnostics.report(
                DiagnosticCode::VersionMismatch,
                Location::entry(0, "version"),
                format!(
                    "expected {derived:02X} from the token content, got {:02X}",
                    self.version
                ),
            );
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[must_use]
    pub fn type_id(&self) -> u8 {
        self.type_id
    }

    #[must_use]
    pub fn meta_length(&self) -> u16 {
        self.meta_length
    }

    /// Whether the entry carries version and archived bytes.
    #[must_use]
    pub fn has_flash_bytes(&self) -> bool {
        self.meta_length != BASE_META_LENGTH
    }

    fn flash_bytes(&self) -> Option<[u8; 2]> {
        self.has_flash_bytes()
            .then_some([self.version, self.archived])
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> String {
        name::decode_name(self.kind, &self.name)
    }

    /// Raw name field.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8; NAME_LEN] {
        &self.name
    }

    /// Replace the name, reporting names outside the kind's vocabulary.
    pub fn set_name(&mut self, name: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.name = name::encode_name(self.kind, name, &mut diagnostics);
        diagnostics
    }

    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Set the version byte. Flashless entries do not store it.
    pub fn set_version(&mut self, version: u8) {
        if self.has_flash_bytes() {
            self.version = version;
        }
    }

    /// Whether the archived byte is `80`.
    #[must_use]
    pub fn archived(&self) -> bool {
        self.archived == ARCHIVED
    }

    /// Raw archived byte.
    #[must_use]
    pub fn archived_byte(&self) -> u8 {
        self.archived
    }

    pub fn archive(&mut self) -> Result<()> {
        self.set_archived("archive", ARCHIVED)
    }

    pub fn unarchive(&mut self) -> Result<()> {
        self.set_archived("unarchive", 0)
    }

    fn set_archived(&mut self, operation: &'static str, value: u8) -> Result<()> {
        if !self.has_flash_bytes() {
            return Err(VarError::unsupported(operation, "entry has no flash bytes"));
        }
        self.archived = value;
        Ok(())
    }

    /// Full data section.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the data section verbatim.
    ///
    /// Fails with [`VarError::DataTooLarge`] past 65535 bytes.
    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        let data = data.into();
        length_field("data", data.len())?;
        self.data = data;
        Ok(())
    }

    /// Serialized length: `2 + meta_length + 2 + data length`.
    ///
    /// An unexpected meta length is written with flash bytes, so it counts
    /// as 13 here.
    #[must_use]
    pub fn length(&self) -> usize {
        2 + layout_meta_length(self.meta_length) + 2 + self.data.len()
    }

    /// Serialize the entry, failing if the data section does not fit its
    /// length fields.
    pub fn try_bytes(&self) -> Result<Vec<u8>> {
        let data_length = length_field("data", self.data.len())?;
        Ok(self.serialize(data_length))
    }

    /// Serialize the entry.
    ///
    /// The checked setters keep the data section within 65535 bytes; an
    /// entry built with a longer [`EntryOptions::data`] is only caught by
    /// [`Entry::try_bytes`], and its length fields saturate here.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let data_length = u16::try_from(self.data.len()).unwrap_or(u16::MAX);
        self.serialize(data_length.to_le_bytes())
    }

    fn serialize(&self, data_length: [u8; 2]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        out.extend_from_slice(&self.meta_length.to_le_bytes());
        out.extend_from_slice(&data_length);
        out.push(self.type_id);
        out.extend_from_slice(&self.name);
        if let Some(flash) = self.flash_bytes() {
            out.extend_from_slice(&flash);
        }
        out.extend_from_slice(&data_length);
        out.extend_from_slice(&self.data);
        out
    }

    /// Extension for a file holding only this entry.
    ///
    /// Generic entries always use `8xg`; asking for one on a specific model
    /// is reported.
    #[must_use]
    pub fn extension(&self, model: Option<&Model>) -> Parsed<String> {
        let mut diagnostics = Diagnostics::new();
        if self.kind == EntryKind::Generic {
            if let Some(model) = model {
                diagnostics.report(
                    DiagnosticCode::UnknownExtensionModel,
                    Location::entry(0, "type_id"),
                    format!(
                        "expected a known kind for {model}, got type id {:02X}; using 8xg",
                        self.type_id
                    ),
                );
            }
            return Parsed::new("8xg".to_string(), diagnostics);
        }
        let prefix = model.map_or("8x", |m| m.signature.extension_prefix());
        Parsed::new(format!("{prefix}{}", self.kind.spec().extension), diagnostics)
    }

    /// Wrap this entry in a container.
    ///
    /// Without a header, one is built for `model`, or the default model.
    #[must_use]
    pub fn export(self, header: Option<Header>, model: Option<&'static Model>) -> Parsed<TiVar> {
        let header = header.unwrap_or_else(|| match model {
            Some(model) => Header::for_model(model),
            None => Header::default(),
        });
        let (mut var, mut diagnostics) = TiVar::new(header, model).into_parts();
        diagnostics.extend(var.add_entry(self));
        Parsed::new(var, diagnostics)
    }
}

/// Bytes counted by the meta length as actually laid out: type id, name,
/// flash bytes unless flashless, repeated data length.
fn layout_meta_length(meta_length: u16) -> usize {
    if meta_length == BASE_META_LENGTH {
        usize::from(BASE_META_LENGTH)
    } else {
        usize::from(FLASH_META_LENGTH)
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new(EntryKind::Generic, EntryOptions::default()).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tivar_standards::models::{TI_83, TI_84PCE};

    /// `PROG` program, flash layout, archived, payload `DE 2A 41 2A`.
    fn archived_program() -> Vec<u8> {
        let mut bytes = vec![0x0D, 0x00, 0x06, 0x00, 0x05];
        bytes.extend_from_slice(b"PROG\0\0\0\0");
        bytes.extend_from_slice(&[0x00, 0x80, 0x06, 0x00]);
        bytes.extend_from_slice(&[0x04, 0x00, 0xDE, 0x2A, 0x41, 0x2A]);
        bytes
    }

    #[test]
    fn test_archived_program_round_trip() {
        let bytes = archived_program();
        let parsed = Entry::from_bytes(&bytes);
        let entry = parsed.value;

        assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
        assert_eq!(entry.kind(), EntryKind::Program);
        assert_eq!(entry.name(), "PROG");
        assert!(entry.archived());
        assert_eq!(entry.length(), bytes.len());
        assert_eq!(entry.bytes(), bytes);
        assert_eq!(entry.bytes()[14], 0x80);
    }

    #[test]
    fn test_nonstandard_archived_byte_is_preserved() {
        let mut bytes = archived_program();
        bytes[14] = 0x01;
        let parsed = Entry::from_bytes(&bytes);

        assert!(parsed.diagnostics.has(DiagnosticCode::ArchivedFlag));
        assert!(!parsed.value.archived());
        assert_eq!(parsed.value.bytes(), bytes);
    }

    #[test]
    fn test_second_data_length_wins() {
        let mut bytes = archived_program();
        bytes[2] = 0x09;
        let parsed = Entry::from_bytes(&bytes);

        assert!(parsed.diagnostics.has(DiagnosticCode::DataLengthMismatch));
        assert_eq!(parsed.value.data().len(), 6);
    }

    #[test]
    fn test_unknown_type_id_stays_generic() {
        let mut bytes = archived_program();
        bytes[4] = 0x2A;
        let parsed = Entry::from_bytes(&bytes);

        assert_eq!(parsed.value.kind(), EntryKind::Generic);
        assert!(parsed.diagnostics.has(DiagnosticCode::UnknownTypeId));
        assert_eq!(parsed.value.bytes(), bytes);
        assert!(matches!(
            parsed.value.coerce(),
            Err(VarError::UnrecognizedTypeId { type_id: 0x2A })
        ));
    }

    #[test]
    fn test_coerce_is_idempotent() {
        let entry = Entry::from_bytes(&archived_program()).value;
        let again = entry.coerce().unwrap();
        assert_eq!(again.kind(), EntryKind::Program);
        assert_eq!(again, entry);
    }

    #[test]
    fn test_load_as_reports_type_mismatch() {
        let parsed = Entry::load_as(EntryKind::String, &archived_program());
        assert!(parsed.diagnostics.has(DiagnosticCode::TypeMismatch));
        assert_eq!(parsed.value.kind(), EntryKind::Program);
    }

    #[test]
    fn test_unexpected_meta_length() {
        let mut bytes = archived_program();
        bytes[0] = 0x0C;
        let parsed = Entry::from_bytes(&bytes);
        assert!(parsed.diagnostics.has(DiagnosticCode::MetaLength));
        assert!(parsed.value.archived());
    }

    #[test]
    fn test_unexpected_meta_length_keeps_layout_consistent() {
        let mut bytes = archived_program();
        bytes[0] = 0x0C;
        let entry = Entry::from_bytes(&bytes).value;

        assert_eq!(entry.meta_length(), 12);
        assert_eq!(entry.bytes(), bytes);
        assert_eq!(entry.length(), bytes.len());
        assert_eq!(Entry::peek_length(&bytes), Some(bytes.len()));

        let reloaded = Entry::from_bytes(&entry.bytes());
        assert!(reloaded.diagnostics.has(DiagnosticCode::MetaLength));
        assert_eq!(reloaded.value, entry);
    }

    #[test]
    fn test_set_data_rejects_oversized_section() {
        let mut entry = Entry::default();
        let err = entry.set_data(vec![0; 0x1_0000]).unwrap_err();
        assert!(matches!(
            err,
            VarError::DataTooLarge {
                field: "data",
                length: 0x1_0000
            }
        ));
        assert!(entry.data().is_empty());
    }

    #[test]
    fn test_try_bytes_rejects_oversized_options_data() {
        let entry = Entry::new(
            EntryKind::Generic,
            EntryOptions::new().data(vec![0; 70_000]),
        )
        .value;
        assert!(matches!(
            entry.try_bytes(),
            Err(VarError::DataTooLarge { length: 70_000, .. })
        ));
        assert!(Entry::default().try_bytes().is_ok());
    }

    #[test]
    fn test_new_defaults() {
        let parsed = Entry::new(EntryKind::Program, EntryOptions::new());
        let entry = parsed.value;

        assert!(parsed.diagnostics.is_empty());
        assert_eq!(entry.type_id(), 0x05);
        assert_eq!(entry.meta_length(), FLASH_META_LENGTH);
        assert_eq!(entry.data(), &[0, 0]);
        assert_eq!(entry.name(), "UNNAMED");

        let generic = Entry::default();
        assert_eq!(generic.type_id(), GENERIC_TYPE_ID);
        assert!(generic.data().is_empty());
    }

    #[test]
    fn test_flashless_drops_flash_fields() {
        let parsed = Entry::new(
            EntryKind::Program,
            EntryOptions::new().flashless().archived(true),
        );
        let entry = parsed.value;

        assert!(parsed.diagnostics.has(DiagnosticCode::FlashlessFlashFields));
        assert!(!entry.archived());
        assert_eq!(entry.length(), entry.bytes().len());
        assert_eq!(entry.bytes().len(), 2 + 11 + 2 + 2);
    }

    #[test]
    fn test_archive_requires_flash_bytes() {
        let mut entry = Entry::new(EntryKind::Program, EntryOptions::new()).value;
        entry.archive().unwrap();
        assert!(entry.archived());
        entry.unarchive().unwrap();
        assert!(!entry.archived());

        let mut flashless = Entry::new(EntryKind::Program, EntryOptions::new().flashless()).value;
        let err = flashless.archive().unwrap_err();
        assert!(matches!(err, VarError::UnsupportedOperation { operation: "archive", .. }));
    }

    #[test]
    fn test_empty_generic_entry_round_trips() {
        let entry = Entry::default();
        let reloaded = Entry::from_bytes(&entry.bytes());
        assert_eq!(reloaded.value, entry);
        assert!(reloaded.diagnostics.has(DiagnosticCode::UnknownTypeId));
    }

    #[test]
    fn test_extensions() {
        let program = Entry::new(EntryKind::Program, EntryOptions::new()).value;
        assert_eq!(program.extension(None).value, "8xp");
        assert_eq!(program.extension(Some(&TI_83)).value, "83p");
        assert_eq!(program.extension(Some(&TI_84PCE)).value, "8xp");

        let equation = Entry::new(EntryKind::Equation, EntryOptions::new()).value;
        assert_eq!(equation.extension(None).value, "8xy");

        let generic = Entry::default().extension(Some(&TI_83));
        assert_eq!(generic.value, "8xg");
        assert!(generic.diagnostics.has(DiagnosticCode::UnknownExtensionModel));
    }

    #[test]
    fn test_peek_length() {
        assert_eq!(Entry::peek_length(&archived_program()), Some(23));
        assert_eq!(Entry::peek_length(&[0x0D, 0x00, 0x06]), None);
    }
}
