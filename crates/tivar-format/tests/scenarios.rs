use tivar_format::tokenized::derive_version;
use tivar_format::{
    DiagnosticCode, Entry, EntryKind, EntryOptions, Header, ReadOptions, Section, TiVar, VarError,
    load_entry_at,
};
use tivar_standards::models::{TI_83PCEEP, TI_84P, TI_84PCE};
use tivar_standards::{BuiltinCatalog, BuiltinTokens, TokenSource};

fn header_bytes(magic: &[u8; 8], product_id: u8) -> Vec<u8> {
    let mut bytes = Header::default().bytes().to_vec();
    bytes[..8].copy_from_slice(magic);
    bytes[10] = product_id;
    bytes
}

/// Entry bytes in the flash layout.
fn flash_entry(type_id: u8, name: &[u8; 8], version: u8, archived: u8, data: &[u8]) -> Vec<u8> {
    let length = (data.len() as u16).to_le_bytes();
    let mut bytes = vec![0x0D, 0x00];
    bytes.extend_from_slice(&length);
    bytes.push(type_id);
    bytes.extend_from_slice(name);
    bytes.extend_from_slice(&[version, archived]);
    bytes.extend_from_slice(&length);
    bytes.extend_from_slice(data);
    bytes
}

fn file_with(entries: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = entries.concat();
    let sum = body.iter().map(|b| u32::from(*b)).sum::<u32>() & 0xFFFF;
    let mut bytes = header_bytes(b"**TI83F*", 0x0A);
    bytes.extend_from_slice(&(body.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&body);
    bytes.extend_from_slice(&(sum as u16).to_le_bytes());
    bytes
}

#[test]
fn shared_signature_without_product_id_resolves_to_richest_model() {
    let header = Header::from_bytes(&header_bytes(b"**TI83F*", 0x00)).value;
    let model = header.derive_model(&BuiltinCatalog);

    assert_eq!(model.value, Some(&TI_83PCEEP));
    assert!(model.diagnostics.is_empty());
}

#[test]
fn archived_program_keeps_its_flag_byte() {
    let bytes = flash_entry(0x05, b"GAME\0\0\0\0", 0x00, 0x80, &[0x01, 0x00, 0xD9]);
    let parsed = Entry::from_bytes(&bytes);

    assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
    assert_eq!(parsed.value.kind(), EntryKind::Program);
    assert!(parsed.value.archived());
    assert_eq!(parsed.value.archived_byte(), 0x80);
    assert_eq!(parsed.value.bytes(), bytes);
}

#[test]
fn version_ranges_and_gaps() {
    assert_eq!(derive_version(&[0xEF, 0x6D]), 0x00);
    assert_eq!(derive_version(&[0xEF, 0x99]), 0x00);
    assert_eq!(derive_version(&[0xEF, 0xA7]), 0x00);
    assert_eq!(derive_version(&[0xEF, 0x9E]), 0x0C);
    assert_eq!(derive_version(&[0xEF, 0x20]), 0x06);
}

#[test]
fn well_formed_file_round_trips() {
    let entries = [
        flash_entry(0x03, b"\x5E\x10\0\0\0\0\0\0", 0x00, 0x00, &[0x02, 0x00, 0x41, 0x70]),
        flash_entry(0x04, b"\xAA\x09\0\0\0\0\0\0", 0x01, 0x00, &[0x02, 0x00, 0xBB, 0xB0]),
        flash_entry(0x06, b"SECRET\0\0", 0x24, 0x80, &[0x02, 0x00, 0xEF, 0x10]),
    ];
    let bytes = file_with(&entries);
    let parsed = TiVar::from_bytes(&bytes);
    let var = &parsed.value;

    assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
    assert_eq!(var.model(), Some(&TI_84P));
    assert_eq!(var.bytes(), bytes);

    let kinds: Vec<_> = var.entries().iter().map(Entry::kind).collect();
    assert_eq!(
        kinds,
        [EntryKind::Equation, EntryKind::String, EntryKind::ProtectedProgram]
    );
    let names: Vec<_> = var.entries().iter().map(Entry::name).collect();
    assert_eq!(names, ["Y1", "Str0", "SECRET"]);

    let table = BuiltinTokens.table_for(&TI_84P).unwrap();
    let texts: Vec<_> = var
        .entries()
        .iter()
        .map(|e| e.string(table).unwrap().value)
        .collect();
    assert_eq!(texts, ["A+", "\"a\"", "ClockOn"]);
}

#[test]
fn unknown_type_id_stays_generic_in_a_container() {
    let bytes = file_with(&[flash_entry(0x15, b"APPVAR\0\0", 0x00, 0x00, &[1, 2, 3])]);
    let parsed = TiVar::from_bytes(&bytes);
    let entry = &parsed.value.entries()[0];

    assert_eq!(entry.kind(), EntryKind::Generic);
    assert_eq!(entry.name(), "APPVAR");
    assert_eq!(parsed.value.bytes(), bytes);

    let diagnostic = parsed
        .diagnostics
        .with_code(DiagnosticCode::UnknownTypeId)
        .next()
        .expect("unknown type id diagnostic");
    assert_eq!(diagnostic.location.section, Section::Entry(0));
}

#[test]
fn zero_length_payloads_round_trip() {
    let entries = [
        flash_entry(0x05, b"EMPTY\0\0\0", 0x00, 0x00, &[0x00, 0x00]),
        flash_entry(0x05, b"BARE\0\0\0\0", 0x00, 0x00, &[]),
    ];
    let bytes = file_with(&entries);
    let parsed = TiVar::from_bytes(&bytes);

    assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
    assert_eq!(parsed.value.bytes(), bytes);
    assert!(parsed.value.entries()[1].payload().is_empty());
}

#[test]
fn flashless_entry_drops_archived_flag() {
    let parsed = Entry::new(
        EntryKind::Program,
        EntryOptions::new().flashless().archived(true).name("A"),
    );
    assert!(parsed.diagnostics.has(DiagnosticCode::FlashlessFlashFields));

    let entry = parsed.value;
    assert!(!entry.archived());
    assert!(!entry.bytes().contains(&0x80));
    assert_eq!(entry.bytes().len(), entry.length());
}

#[test]
fn stored_version_is_checked_against_tokens() {
    let bytes = flash_entry(0x05, b"NEW\0\0\0\0\0", 0x00, 0x00, &[0x02, 0x00, 0xEF, 0x97]);
    let parsed = Entry::from_bytes(&bytes);
    assert!(parsed.diagnostics.has(DiagnosticCode::VersionMismatch));
    assert!(!parsed.diagnostics.has(DiagnosticCode::UnknownVersion));

    let bytes = flash_entry(0x05, b"ODD\0\0\0\0\0", 0x07, 0x00, &[0x00, 0x00]);
    let parsed = Entry::from_bytes(&bytes);
    assert!(parsed.diagnostics.has(DiagnosticCode::UnknownVersion));
}

#[test]
fn sized_prefix_mismatch_is_reported() {
    let bytes = flash_entry(0x05, b"BAD\0\0\0\0\0", 0x00, 0x00, &[0x05, 0x00, 0x41]);
    let parsed = Entry::from_bytes(&bytes);

    assert!(parsed.diagnostics.has(DiagnosticCode::SizedLengthMismatch));
    assert_eq!(parsed.value.payload(), &[0x41]);
    assert_eq!(parsed.value.bytes(), bytes);
}

#[test]
fn strict_reading_rejects_warnings() {
    let mut bytes = file_with(&[flash_entry(0x05, b"A\0\0\0\0\0\0\0", 0, 0, &[0, 0])]);
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    let lenient = TiVar::load(&bytes, &ReadOptions::new()).expect("lenient load");
    assert!(lenient.diagnostics.has(DiagnosticCode::ChecksumMismatch));

    let strict = TiVar::load(&bytes, &ReadOptions::new().strict());
    let Err(VarError::Rejected(diagnostics)) = strict else {
        panic!("strict load should reject");
    };
    assert!(diagnostics.has(DiagnosticCode::ChecksumMismatch));
}

#[test]
fn entries_load_by_position() {
    let entries = [
        flash_entry(0x05, b"FIRST\0\0\0", 0, 0, &[0, 0]),
        flash_entry(0x04, b"\xAA\x01\0\0\0\0\0\0", 0, 0, &[1, 0, 0x41]),
        flash_entry(0x05, b"THIRD\0\0\0", 0, 0, &[0, 0]),
    ];
    let bytes = file_with(&entries);

    let second = load_entry_at(&bytes, 1).expect("second entry").value;
    assert_eq!(second.kind(), EntryKind::String);
    assert_eq!(second.name(), "Str2");

    let third = load_entry_at(&bytes, 2).expect("third entry").value;
    assert_eq!(third.name(), "THIRD");

    assert!(matches!(
        load_entry_at(&bytes, 3),
        Err(VarError::EntryNotFound { index: 3, count: 3 })
    ));
}

#[test]
fn exporting_for_a_shared_model_is_consistent() {
    let table = BuiltinTokens.table_for(&TI_84PCE).unwrap();
    let mut entry = Entry::new(EntryKind::Program, EntryOptions::new().name("CONV")).value;
    entry.load_string("toString(1", table).expect("encodable");

    let exported = entry.export(None, Some(&TI_84PCE));
    assert!(exported.diagnostics.is_empty(), "{}", exported.diagnostics);

    let var = exported.value;
    assert_eq!(var.extension().value, "8xp");
    assert_eq!(var.header().product_id(), 0x13);
    assert_eq!(var.entries()[0].version(), 0x0B);

    let reloaded = TiVar::load(&var.bytes(), &ReadOptions::new().expected_model(&TI_84PCE))
        .expect("load");
    assert!(reloaded.diagnostics.is_empty(), "{}", reloaded.diagnostics);
    assert_eq!(reloaded.value, var);
}

#[test]
fn header_shorthand_builds_groups() {
    let a = Entry::new(EntryKind::Program, EntryOptions::new().name("A")).value;
    let b = Entry::new(EntryKind::String, EntryOptions::new()).value;
    let parsed = Header::for_model(&TI_84P).with_entries([a, b]);

    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.value.entries().len(), 2);
    assert_eq!(parsed.value.model(), Some(&TI_84P));
    assert_eq!(parsed.value.extension().value, "8xg");
}
