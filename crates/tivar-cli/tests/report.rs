//! Rendering of the `tivar` reports.

use tivar_cli::report::{
    FileReport, ModelReport, diagnostic_lines, entries_table, models_table,
};
use tivar_format::{Entry, EntryKind, EntryOptions, TiVar};
use tivar_standards::models::TI_84PCE;
use tivar_standards::{BuiltinCatalog, ModelCatalog};

/// Program `A` with an empty payload, exported for the TI-84+CE.
fn program_file() -> Vec<u8> {
    let entry = Entry::new(EntryKind::Program, EntryOptions::new().name("A")).value;
    entry.export(None, Some(&TI_84PCE)).value.bytes()
}

#[test]
fn file_report_json() {
    let parsed = TiVar::from_bytes(&program_file());
    let report = FileReport::new("A.8xp", &parsed.value, parsed.diagnostics);
    let json = serde_json::to_string_pretty(&report).expect("serialize");

    insta::assert_snapshot!(json, @r#"
    {
      "path": "A.8xp",
      "signature": "**TI83F*",
      "product_id": "13",
      "model": "TI-83 Premium CE Python",
      "comment": "Created with tivar",
      "extension": "8xp",
      "checksum": "0057",
      "entries": [
        {
          "index": 0,
          "kind": "program",
          "type_id": "05",
          "name": "A",
          "version": "00",
          "archived": false,
          "length": 19,
          "payload_length": 0
        }
      ],
      "diagnostics": []
    }
    "#);
}

#[test]
fn diagnostics_render_one_per_line() {
    let mut bytes = program_file();
    // Archived byte of the only entry; the stored checksum is left stale.
    bytes[55 + 14] = 0x01;
    let parsed = TiVar::from_bytes(&bytes);

    insta::assert_snapshot!(diagnostic_lines(&parsed.diagnostics), @r"
    [TIV014] WARNING: expected 00 or 80, got 01 (at ENTRY[0].archived @14)
    [TIV020] WARNING: expected 0058, got 0057 (at CHECKSUM.checksum)
    ");
}

#[test]
fn entries_table_lists_every_entry() {
    let parsed = TiVar::from_bytes(&program_file());
    let report = FileReport::new("A.8xp", &parsed.value, parsed.diagnostics);
    let rendered = entries_table(&report.entries).to_string();

    assert!(rendered.contains("program"));
    assert!(rendered.contains("05"));
}

#[test]
fn models_table_covers_the_catalog() {
    let models: Vec<ModelReport> = BuiltinCatalog
        .models()
        .iter()
        .copied()
        .map(ModelReport::from)
        .collect();
    assert_eq!(models.len(), 13);

    let rendered = models_table(&models).to_string();
    assert!(rendered.contains("TI-84+CE Python"));
    assert!(rendered.contains("**TI82**"));
}
