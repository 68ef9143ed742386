//! Reports printed by the `tivar` commands.
//!
//! Every report is a plain serializable struct; `--json` prints it with
//! `serde_json`, otherwise it is rendered as `comfy-table` tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use tivar_format::{Diagnostics, Entry, EntryKind, Severity, TiVar};
use tivar_standards::Model;

/// Summary of a whole variable file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub signature: Option<String>,
    pub product_id: String,
    pub model: Option<String>,
    pub comment: String,
    pub extension: String,
    pub checksum: String,
    pub entries: Vec<EntryReport>,
    pub diagnostics: Diagnostics,
}

impl FileReport {
    #[must_use]
    pub fn new(path: impl Into<String>, var: &TiVar, diagnostics: Diagnostics) -> Self {
        let header = var.header();
        Self {
            path: path.into(),
            signature: header.signature().as_ref().map(ToString::to_string),
            product_id: hex::encode_upper([header.product_id()]),
            model: var.model().map(|m| m.name.to_string()),
            comment: header.comment(),
            extension: var.extension().value,
            checksum: hex::encode_upper(var.checksum().to_be_bytes()),
            entries: var
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| EntryReport::new(index, entry))
                .collect(),
            diagnostics,
        }
    }
}

/// One row of the entry listing.
#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub index: usize,
    pub kind: EntryKind,
    pub type_id: String,
    pub name: String,
    /// `None` for the flashless layout.
    pub version: Option<String>,
    pub archived: bool,
    pub length: usize,
    pub payload_length: usize,
}

impl EntryReport {
    #[must_use]
    pub fn new(index: usize, entry: &Entry) -> Self {
        Self {
            index,
            kind: entry.kind(),
            type_id: hex::encode_upper([entry.type_id()]),
            name: entry.name(),
            version: entry
                .has_flash_bytes()
                .then(|| hex::encode_upper([entry.version()])),
            archived: entry.archived(),
            length: entry.length(),
            payload_length: entry.payload().len(),
        }
    }
}

/// Decoded text of one entry.
#[derive(Debug, Serialize)]
pub struct TextReport {
    pub index: usize,
    pub name: String,
    pub kind: EntryKind,
    pub text: String,
    pub diagnostics: Diagnostics,
}

/// Catalog row for `tivar models`.
#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub name: &'static str,
    pub signature: String,
    pub product_id: String,
    pub flash: bool,
    pub extension_prefix: &'static str,
}

impl From<&'static Model> for ModelReport {
    fn from(model: &'static Model) -> Self {
        Self {
            name: model.name,
            signature: model.signature.to_string(),
            product_id: hex::encode_upper([model.product_id]),
            flash: model.has_flash(),
            extension_prefix: model.signature.extension_prefix(),
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Header fields as a two-column table.
#[must_use]
pub fn header_table(report: &FileReport) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    let unknown = || dim_cell("unknown");
    let rows = [
        ("File", Cell::new(&report.path)),
        (
            "Signature",
            report.signature.as_ref().map_or_else(unknown, Cell::new),
        ),
        ("Product id", Cell::new(&report.product_id)),
        ("Model", report.model.as_ref().map_or_else(unknown, Cell::new)),
        ("Comment", Cell::new(&report.comment)),
        ("Extension", Cell::new(&report.extension)),
        ("Checksum", Cell::new(&report.checksum)),
    ];
    for (label, value) in rows {
        table.add_row(vec![header_cell(label), value]);
    }
    table
}

#[must_use]
pub fn entries_table(entries: &[EntryReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Kind"),
        header_cell("Type"),
        header_cell("Name"),
        header_cell("Version"),
        header_cell("Archived"),
        header_cell("Bytes"),
        header_cell("Payload"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Center);
    align_column(&mut table, 6, CellAlignment::Right);
    align_column(&mut table, 7, CellAlignment::Right);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.index),
            kind_cell(entry.kind),
            Cell::new(&entry.type_id),
            Cell::new(&entry.name).add_attribute(Attribute::Bold),
            entry.version.as_ref().map_or_else(|| dim_cell("-"), Cell::new),
            if entry.archived {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            Cell::new(entry.length),
            Cell::new(entry.payload_length),
        ]);
    }
    table
}

#[must_use]
pub fn diagnostics_table(diagnostics: &Diagnostics) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Severity"),
        header_cell("Location"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for diagnostic in diagnostics {
        table.add_row(vec![
            Cell::new(diagnostic.code),
            severity_cell(diagnostic.severity),
            Cell::new(&diagnostic.location),
            Cell::new(&diagnostic.message),
        ]);
    }
    table
}

/// Catalog listing for `tivar models`.
#[must_use]
pub fn models_table(models: &[ModelReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Model"),
        header_cell("Signature"),
        header_cell("Product id"),
        header_cell("Flash"),
        header_cell("Extension"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Center);
    for model in models {
        table.add_row(vec![
            Cell::new(model.name).add_attribute(Attribute::Bold),
            Cell::new(&model.signature),
            Cell::new(&model.product_id),
            if model.flash {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            Cell::new(format!("{}?", model.extension_prefix)),
        ]);
    }
    table
}

/// One line per diagnostic, for stderr.
#[must_use]
pub fn diagnostic_lines(diagnostics: &Diagnostics) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn kind_cell(kind: EntryKind) -> Cell {
    match kind {
        EntryKind::Generic => dim_cell(kind),
        EntryKind::ProtectedProgram => Cell::new(kind).fg(Color::Magenta),
        _ => Cell::new(kind).fg(Color::Blue),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::DarkGrey),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
