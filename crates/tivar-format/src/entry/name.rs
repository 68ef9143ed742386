//! Name field codecs.
//!
//! The 8-byte name field is interpreted per kind:
//!
//! - equations: one of a fixed set of two-byte variable tokens (`5E xx`)
//! - strings: `Str1`..`Str0` (`AA 00`..`AA 09`)
//! - programs: up to 8 of `A-Z`, `0-9` and `θ`
//! - generic: printable bytes up to the first NUL

use super::kind::EntryKind;
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};

/// Name field length in bytes.
pub const NAME_LEN: usize = 8;

const EQUATION_PREFIX: u8 = 0x5E;
const STRING_PREFIX: u8 = 0xAA;
const THETA_BYTE: u8 = 0x5B;
const THETA: char = 'θ';
const THETA_LOOKALIKES: [char; 4] = ['\u{03B8}', '\u{0398}', '\u{03F4}', '\u{1DBF}'];

/// Equation variables in storage form with their page byte.
///
/// Storage form is lower-case and brace-wrapped, except the sequence
/// variables which carry a `|` marker instead.
const EQUATION_SLOTS: [(&str, u8); 31] = [
    ("{y1}", 0x10),
    ("{y2}", 0x11),
    ("{y3}", 0x12),
    ("{y4}", 0x13),
    ("{y5}", 0x14),
    ("{y6}", 0x15),
    ("{y7}", 0x16),
    ("{y8}", 0x17),
    ("{y9}", 0x18),
    ("{y0}", 0x19),
    ("{x1t}", 0x20),
    ("{y1t}", 0x21),
    ("{x2t}", 0x22),
    ("{y2t}", 0x23),
    ("{x3t}", 0x24),
    ("{y3t}", 0x25),
    ("{x4t}", 0x26),
    ("{y4t}", 0x27),
    ("{x5t}", 0x28),
    ("{y5t}", 0x29),
    ("{x6t}", 0x2A),
    ("{y6t}", 0x2B),
    ("{r1}", 0x40),
    ("{r2}", 0x41),
    ("{r3}", 0x42),
    ("{r4}", 0x43),
    ("{r5}", 0x44),
    ("{r6}", 0x45),
    ("|u", 0x80),
    ("|v", 0x81),
    ("|w", 0x82),
];

/// Encode a display name into the name field of `kind`.
///
/// Names outside the kind's vocabulary are reported and stored as their
/// filtered ASCII bytes.
pub(crate) fn encode_name(
    kind: EntryKind,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> [u8; NAME_LEN] {
    let encoded = match kind {
        EntryKind::Equation => {
            let storage = equation_storage_form(name);
            EQUATION_SLOTS
                .iter()
                .find(|(slot, _)| *slot == storage)
                .map(|(_, page)| vec![EQUATION_PREFIX, *page])
        }
        EntryKind::String => string_index(name).map(|i| vec![STRING_PREFIX, i]),
        EntryKind::Program | EntryKind::ProtectedProgram => {
            let filtered = program_name(name);
            let valid = filtered
                .chars()
                .next()
                .is_some_and(|c| !c.is_ascii_digit());
            if !valid {
                invalid_name(kind, name, &filtered, diagnostics);
            }
            return pad(filtered.chars().map(|c| if c == THETA { THETA_BYTE } else { c as u8 }));
        }
        EntryKind::Generic => None,
    };

    match encoded {
        Some(bytes) => pad(bytes),
        None => {
            let fallback: String = name.chars().filter(|c| c.is_ascii_graphic()).collect();
            if kind != EntryKind::Generic {
                invalid_name(kind, name, &fallback, diagnostics);
            }
            pad(fallback.bytes())
        }
    }
}

/// Decode the name field of `kind` into its display form.
pub(crate) fn decode_name(kind: EntryKind, raw: &[u8; NAME_LEN]) -> String {
    match (kind, raw[0]) {
        (EntryKind::Equation, EQUATION_PREFIX) => {
            if let Some((slot, _)) = EQUATION_SLOTS.iter().find(|(_, page)| *page == raw[1]) {
                return equation_display_form(slot);
            }
        }
        (EntryKind::String, STRING_PREFIX) if raw[1] <= 9 => {
            return format!("Str{}", (raw[1] + 1) % 10);
        }
        _ => {}
    }
    raw.iter()
        .take_while(|b| **b != 0)
        .map(|b| match *b {
            THETA_BYTE if kind != EntryKind::Generic => THETA,
            b if b.is_ascii_graphic() => b as char,
            _ => char::REPLACEMENT_CHARACTER,
        })
        .collect()
}

/// `Y1` → `{y1}`, `u` → `|u`; already-stored forms pass through.
fn equation_storage_form(name: &str) -> String {
    let lower: String = name.chars().take(NAME_LEN).collect::<String>().to_lowercase();
    if lower.starts_with('|') || matches!(lower.as_str(), "u" | "v" | "w") {
        match lower.chars().last() {
            Some(last) => format!("|{last}"),
            None => lower,
        }
    } else if lower.starts_with('{') || lower.ends_with('}') {
        lower
    } else {
        format!("{{{lower}}}")
    }
}

fn equation_display_form(storage: &str) -> String {
    match storage.strip_prefix('|') {
        Some(marked) => marked.to_string(),
        None => storage
            .to_uppercase()
            .trim_matches(|c| c == '{' || c == '}')
            .to_string(),
    }
}

fn string_index(name: &str) -> Option<u8> {
    let digit = name
        .get(..3)
        .filter(|p| p.eq_ignore_ascii_case("str"))
        .and_then(|_| name[3..].parse::<u8>().ok())
        .filter(|d| *d <= 9 && name.len() == 4)?;
    Some((digit + 9) % 10)
}

/// Upper-case, fold θ look-alikes, drop anything outside `A-Z0-9θ`.
fn program_name(name: &str) -> String {
    name.chars()
        .take(NAME_LEN)
        .flat_map(char::to_uppercase)
        .map(|c| if THETA_LOOKALIKES.contains(&c) { THETA } else { c })
        .filter(|c| *c == THETA || c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

fn invalid_name(kind: EntryKind, name: &str, kept: &str, diagnostics: &mut Diagnostics) {
    diagnostics.report(
        DiagnosticCode::InvalidName,
        Location::entry(0, "name"),
        format!("invalid {kind} name {name:?}, keeping {kept:?}"),
    );
}

fn pad(bytes: impl IntoIterator<Item = u8>) -> [u8; NAME_LEN] {
    let mut out = [0u8; NAME_LEN];
    for (slot, byte) in out.iter_mut().zip(bytes) {
        *slot = byte;
    }
    out
}
