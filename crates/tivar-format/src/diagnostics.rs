//! Recoverable parse findings.
//!
//! Real-world variable files are full of tool-generated quirks in fields the
//! calculator never checks, so parsing is permissive: anything short of an
//! unusable structure is recorded as a [`Diagnostic`] and parsing continues.
//! Callers decide what is fatal, either per diagnostic or wholesale through
//! [`Diagnostics::into_result`].
//!
//! # Example
//!
//! ```
//! use tivar_format::{DiagnosticCode, TiVar};
//!
//! let mut bytes = TiVar::default().bytes();
//! let last = bytes.len() - 1;
//! bytes[last] ^= 0xFF;
//!
//! let parsed = TiVar::from_bytes(&bytes);
//! assert!(parsed.diagnostics.has(DiagnosticCode::ChecksumMismatch));
//! for diagnostic in &parsed.diagnostics {
//!     println!("{diagnostic}");
//! }
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::{Result, VarError};

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, nothing is wrong with the bytes.
    Info,
    /// The bytes deviate from the format but were read anyway.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// Kind of recoverable finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Header signature matches no known family.
    UnknownSignature,
    /// Product id matches no model of the signature family.
    UnknownProductId,
    /// Header model differs from the expected model.
    ModelMismatch,
    /// Input ended before a fixed-size field was complete.
    Truncated,
    /// Entry type id differs from the requested entry kind.
    TypeMismatch,
    /// Entry type id has no registered kind.
    UnknownTypeId,
    /// Entry version byte is not a known version of its kind.
    UnknownVersion,
    /// Entry version byte differs from the version derived from its tokens.
    VersionMismatch,
    /// Archived byte is neither `00` nor `80`.
    ArchivedFlag,
    /// Meta length is neither 11 nor 13.
    MetaLength,
    /// The two data length fields of an entry disagree.
    DataLengthMismatch,
    /// The length prefix inside a sized data section is wrong.
    SizedLengthMismatch,
    /// Stored checksum differs from the computed one.
    ChecksumMismatch,
    /// Entries of one container use different meta lengths.
    MixedMetaLength,
    /// Version or archived flag given for a flashless entry.
    FlashlessFlashFields,
    /// Entry name violates the naming rules of its kind.
    InvalidName,
    /// More entries present than were requested.
    MultipleEntries,
    /// Token bytes with no entry in the token table.
    MalformedToken,
    /// No extension is registered for the entry kind on this model.
    UnknownExtensionModel,
}

impl DiagnosticCode {
    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownSignature => "TIV001",
            Self::UnknownProductId => "TIV002",
            Self::ModelMismatch => "TIV003",
            Self::Truncated => "TIV004",
            Self::TypeMismatch => "TIV010",
            Self::UnknownTypeId => "TIV011",
            Self::UnknownVersion => "TIV012",
            Self::VersionMismatch => "TIV013",
            Self::ArchivedFlag => "TIV014",
            Self::MetaLength => "TIV015",
            Self::DataLengthMismatch => "TIV016",
            Self::SizedLengthMismatch => "TIV017",
            Self::ChecksumMismatch => "TIV020",
            Self::MixedMetaLength => "TIV021",
            Self::FlashlessFlashFields => "TIV030",
            Self::InvalidName => "TIV031",
            Self::MultipleEntries => "TIV032",
            Self::MalformedToken => "TIV040",
            Self::UnknownExtensionModel => "TIV050",
        }
    }

    /// Default severity.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnknownExtensionModel => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part of a variable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "section", content = "index", rename_all = "lowercase")]
pub enum Section {
    /// The 53-byte header.
    Header,
    /// Entry at the given position.
    Entry(usize),
    /// Trailing checksum.
    Checksum,
    /// The container as a whole.
    Container,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "HEADER"),
            Self::Entry(index) => write!(f, "ENTRY[{index}]"),
            Self::Checksum => write!(f, "CHECKSUM"),
            Self::Container => write!(f, "CONTAINER"),
        }
    }
}

/// Where a diagnostic was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Section of the file.
    #[serde(flatten)]
    pub section: Section,
    /// Offending field.
    pub field: &'static str,
    /// Byte offset within the section, if known.
    pub offset: Option<usize>,
}

impl Location {
    /// Field of the header.
    #[must_use]
    pub const fn header(field: &'static str) -> Self {
        Self {
            section: Section::Header,
            field,
            offset: None,
        }
    }

    /// Field of an entry.
    #[must_use]
    pub const fn entry(index: usize, field: &'static str) -> Self {
        Self {
            section: Section::Entry(index),
            field,
            offset: None,
        }
    }

    /// Field of the container.
    #[must_use]
    pub const fn container(field: &'static str) -> Self {
        Self {
            section: Section::Container,
            field,
            offset: None,
        }
    }

    /// The checksum trailer.
    #[must_use]
    pub const fn checksum() -> Self {
        Self {
            section: Section::Checksum,
            field: "checksum",
            offset: None,
        }
    }

    /// Attach a byte offset.
    #[must_use]
    pub const fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Move an entry location to another index.
    ///
    /// Entries parse themselves as entry 0; containers renumber.
    #[must_use]
    pub const fn reindexed(mut self, index: usize) -> Self {
        if let Section::Entry(_) = self.section {
            self.section = Section::Entry(index);
        }
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.field)?;
        if let Some(offset) = self.offset {
            write!(f, " @{offset}")?;
        }
        Ok(())
    }
}

/// A single recoverable finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the finding.
    pub severity: Severity,
    /// Finding kind.
    pub code: DiagnosticCode,
    /// Human-readable message with expected and actual values.
    pub message: String,
    /// Where it was found.
    pub location: Location,
}

impl Diagnostic {
    /// Create a diagnostic at the code's default severity.
    pub fn new(code: DiagnosticCode, location: Location, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} (at {})",
            self.code, self.severity, self.message, self.location
        )
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            code = diagnostic.code.as_str(),
            location = %diagnostic.location,
            "{}",
            diagnostic.message
        );
        self.0.push(diagnostic);
    }

    /// Record a diagnostic at the code's default severity.
    pub fn report(&mut self, code: DiagnosticCode, location: Location, message: impl Into<String>) {
        self.push(Diagnostic::new(code, location, message));
    }

    /// Append every diagnostic of `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        for diagnostic in other.0 {
            self.push(diagnostic);
        }
    }

    /// Append entry diagnostics, renumbered to the entry's position.
    pub fn extend_for_entry(&mut self, index: usize, other: Diagnostics) {
        for mut diagnostic in other.0 {
            diagnostic.location = diagnostic.location.reindexed(index);
            self.0.push(diagnostic);
        }
    }

    /// Whether any diagnostic has the given code.
    #[must_use]
    pub fn has(&self, code: DiagnosticCode) -> bool {
        self.0.iter().any(|d| d.code == code)
    }

    /// Diagnostics with the given code.
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |d| d.code == code)
    }

    /// Count warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.0
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in the order recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Message of the first diagnostic, or an empty string.
    #[must_use]
    pub fn first_message(&self) -> &str {
        self.0.first().map_or("", |d| d.message.as_str())
    }

    /// Fail with [`VarError::Rejected`] if any warning was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.warning_count() > 0 {
            Err(VarError::Rejected(self))
        } else {
            Ok(())
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

/// A parsed value together with the findings made while parsing it.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    /// The parsed value.
    pub value: T,
    /// Findings recorded while parsing.
    pub diagnostics: Diagnostics,
}

impl<T> Parsed<T> {
    /// Wrap a value with its diagnostics.
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }

    /// Split into value and diagnostics.
    pub fn into_parts(self) -> (T, Diagnostics) {
        (self.value, self.diagnostics)
    }

    /// The value if no warning was recorded, otherwise [`VarError::Rejected`].
    pub fn into_strict(self) -> Result<T> {
        self.diagnostics.into_result()?;
        Ok(self.value)
    }

    /// Map the value, keeping the diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}
