//! Entry kinds and the type id registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

/// Type id written by entries of unknown kind.
pub const GENERIC_TYPE_ID: u8 = 0xFF;

/// Concrete interpretation of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Uninterpreted record; the state before coercion.
    Generic,
    /// Function, parametric, polar or sequence equation.
    Equation,
    /// String variable.
    String,
    /// Program.
    Program,
    /// Edit-locked program.
    ProtectedProgram,
}

/// Per-kind rules.
#[derive(Debug)]
pub struct KindSpec {
    pub kind: EntryKind,
    /// Type id on disk. `None` for generic entries.
    pub type_id: Option<u8>,
    /// Extension suffix appended to the model's extension prefix.
    pub extension: &'static str,
    /// Data starts with a 2-byte length prefix.
    pub sized: bool,
    /// Data after the prefix is token bytes.
    pub tokenized: bool,
    /// Data section length of a fresh entry.
    pub min_data_length: usize,
    /// Default display name of a fresh entry.
    pub default_name: &'static str,
}

const fn text_kind(
    kind: EntryKind,
    type_id: u8,
    extension: &'static str,
    default_name: &'static str,
) -> KindSpec {
    KindSpec {
        kind,
        type_id: Some(type_id),
        extension,
        sized: true,
        tokenized: true,
        min_data_length: 2,
        default_name,
    }
}

static KINDS: [KindSpec; 5] = [
    KindSpec {
        kind: EntryKind::Generic,
        type_id: None,
        extension: "g",
        sized: false,
        tokenized: false,
        min_data_length: 0,
        default_name: "UNNAMED",
    },
    text_kind(EntryKind::Equation, 0x03, "y", "Y1"),
    text_kind(EntryKind::String, 0x04, "s", "Str1"),
    text_kind(EntryKind::Program, 0x05, "p", "UNNAMED"),
    text_kind(EntryKind::ProtectedProgram, 0x06, "p", "UNNAMED"),
];

/// Type id to kind lookup, built on first use and read-only afterwards.
///
/// Every kind is registered before the map is first read; there is no way
/// to register kinds at runtime.
static REGISTRY: LazyLock<HashMap<u8, EntryKind>> = LazyLock::new(|| {
    KINDS
        .iter()
        .filter_map(|spec| spec.type_id.map(|id| (id, spec.kind)))
        .collect()
});

impl EntryKind {
    /// Every kind, generic first.
    pub const ALL: [EntryKind; 5] = [
        Self::Generic,
        Self::Equation,
        Self::String,
        Self::Program,
        Self::ProtectedProgram,
    ];

    /// Registered kind for a type id.
    #[must_use]
    pub fn from_type_id(type_id: u8) -> Option<EntryKind> {
        REGISTRY.get(&type_id).copied()
    }

    /// Rules for this kind.
    #[must_use]
    pub fn spec(self) -> &'static KindSpec {
        let index = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        &KINDS[index]
    }

    /// Type id written by fresh entries of this kind.
    #[must_use]
    pub fn type_id(self) -> u8 {
        self.spec().type_id.unwrap_or(GENERIC_TYPE_ID)
    }

    #[must_use]
    pub fn is_sized(self) -> bool {
        self.spec().sized
    }

    #[must_use]
    pub fn is_tokenized(self) -> bool {
        self.spec().tokenized
    }

    /// Protected programs are a distinct type id, not a flag.
    #[must_use]
    pub fn is_protected(self) -> bool {
        self == Self::ProtectedProgram
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generic => "generic",
            Self::Equation => "equation",
            Self::String => "string",
            Self::Program => "program",
            Self::ProtectedProgram => "protected program",
        };
        f.write_str(name)
    }
}
