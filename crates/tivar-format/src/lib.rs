//! TI graphing calculator variable files.
//!
//! This crate reads and writes the variable files (`.8xp`, `.8xs`, `.8xy`,
//! `.8xg`, ...) exchanged with TI-82/83/84 series calculators:
//!
//! - [`Header`]: the fixed 53-byte preamble and model derivation
//! - [`Entry`]: type-tagged variable records with kind coercion
//! - [`tokenized`]: the token codec and version inference for programs,
//!   strings and equations
//! - [`TiVar`]: the container with its entry sequence and checksum
//!
//! Parsing is permissive. Problems that do not prevent reading a file are
//! returned as [`Diagnostics`] next to the parsed value; see
//! [`ReadOptions::strict`] to reject them instead.
//!
//! # Example
//!
//! ```
//! use tivar_format::{Entry, EntryKind, EntryOptions, TiVar};
//! use tivar_standards::models::TI_84PCE;
//! use tivar_standards::{BuiltinTokens, TokenSource};
//!
//! let table = BuiltinTokens.table_for(&TI_84PCE).unwrap();
//!
//! let mut program = Entry::new(EntryKind::Program, EntryOptions::new().name("HELLO")).value;
//! program.load_string("Disp \"HELLO\"", table).unwrap();
//!
//! let var = program.export(None, Some(&TI_84PCE)).value;
//! assert_eq!(var.extension().value, "8xp");
//!
//! let reloaded = TiVar::from_bytes(&var.bytes());
//! assert!(reloaded.diagnostics.is_empty());
//! let text = reloaded.value.entries()[0].string(table).unwrap().value;
//! assert_eq!(text, "Disp \"HELLO\"");
//! ```

mod cursor;
pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod header;
pub mod options;
pub mod reader;
pub mod tokenized;
pub mod var;
pub mod writer;

pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Location, Parsed, Section, Severity};
pub use entry::{Entry, EntryKind};
pub use error::{Result, VarError};
pub use header::Header;
pub use options::{EntryOptions, HeaderOptions, ReadOptions};
pub use reader::VarReader;
pub use var::{TiVar, checksum, load_entry_at, load_single_entry};
pub use writer::VarWriter;
