//! Bounds-tolerant little-endian reads over a byte slice.

use crate::diagnostics::{DiagnosticCode, Diagnostics, Location, Section};
use crate::error::{Result, VarError};

/// Forward-only reader that never fails.
///
/// Fixed-width fields past the end of input are zero-filled and reported
/// as [`DiagnosticCode::Truncated`].
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    section: Section,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8], section: Section) -> Self {
        Self {
            data,
            pos: 0,
            section,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    pub(crate) fn location(&self, field: &'static str) -> Location {
        Location {
            section: self.section,
            field,
            offset: Some(self.pos),
        }
    }

    /// Take up to `len` bytes, reporting a shortfall.
    pub(crate) fn take(
        &mut self,
        len: usize,
        field: &'static str,
        diagnostics: &mut Diagnostics,
    ) -> &'a [u8] {
        let rest = self.rest();
        if rest.len() < len {
            diagnostics.report(
                DiagnosticCode::Truncated,
                self.location(field),
                format!("expected {len} byte(s) of {field}, got {}", rest.len()),
            );
        }
        let taken = &rest[..len.min(rest.len())];
        self.pos += taken.len();
        taken
    }

    /// Take a fixed-width field, zero-filling a shortfall.
    pub(crate) fn array<const N: usize>(
        &mut self,
        field: &'static str,
        diagnostics: &mut Diagnostics,
    ) -> [u8; N] {
        let mut out = [0u8; N];
        let taken = self.take(N, field, diagnostics);
        out[..taken.len()].copy_from_slice(taken);
        out
    }

    pub(crate) fn u8(&mut self, field: &'static str, diagnostics: &mut Diagnostics) -> u8 {
        let [byte] = self.array::<1>(field, diagnostics);
        byte
    }

    pub(crate) fn u16_le(&mut self, field: &'static str, diagnostics: &mut Diagnostics) -> u16 {
        u16::from_le_bytes(self.array::<2>(field, diagnostics))
    }
}

/// A length as a 2-byte little-endian field.
pub(crate) fn length_field(field: &'static str, length: usize) -> Result<[u8; 2]> {
    u16::try_from(length)
        .map(u16::to_le_bytes)
        .map_err(|_| VarError::DataTooLarge { field, length })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fill() {
        let mut diagnostics = Diagnostics::new();
        let mut cursor = ByteCursor::new(&[0x34, 0x12, 0xAB], Section::Header);

        assert_eq!(cursor.u16_le("length", &mut diagnostics), 0x1234);
        assert!(diagnostics.is_empty());

        assert_eq!(cursor.array::<3>("name", &mut diagnostics), [0xAB, 0, 0]);
        assert!(diagnostics.has(DiagnosticCode::Truncated));
        assert!(cursor.rest().is_empty());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_length_field_rejects_overflow() {
        assert_eq!(length_field("data", 0x0102).unwrap(), [0x02, 0x01]);
        assert_eq!(length_field("data", 0xFFFF).unwrap(), [0xFF, 0xFF]);
        assert!(matches!(
            length_field("data", 0x1_0000),
            Err(VarError::DataTooLarge {
                field: "data",
                length: 0x1_0000
            })
        ));
    }
}
