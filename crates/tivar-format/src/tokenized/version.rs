//! Minimum-version inference from token content.
//!
//! Each firmware generation added tokens at higher page bytes of the
//! extended prefixes, so the highest page range present bounds the firmware
//! needed to display a payload. Clock support is orthogonal and is carried
//! in a separate bit.

use std::ops::RangeInclusive;

/// Bit set when a payload uses clock tokens.
pub const CLOCK_FLAG: u8 = 0x20;

/// A page range of an extended prefix introduced by one firmware generation.
#[derive(Debug, Clone)]
pub struct VersionRange {
    pub prefix: u8,
    pub pages: RangeInclusive<u8>,
    pub version: u8,
}

const fn range(prefix: u8, start: u8, end: u8, version: u8) -> VersionRange {
    VersionRange {
        prefix,
        pages: start..=end,
        version,
    }
}

/// Version ranges, newest first. The first range present wins.
pub static VERSION_RANGES: [VersionRange; 9] = [
    range(0xEF, 0x9E, 0xA6, 0x0C),
    range(0xEF, 0x73, 0x98, 0x0B),
    range(0xEF, 0x41, 0x6C, 0x0A),
    range(0xEF, 0x17, 0x3D, 0x06),
    range(0xEF, 0x13, 0x16, 0x05),
    range(0xEF, 0x00, 0x12, 0x04),
    range(0xBB, 0xDB, 0xF5, 0x03),
    range(0xBB, 0xCF, 0xDA, 0x02),
    range(0xBB, 0x68, 0xCE, 0x01),
];

/// Clock and date tokens.
pub static CLOCK_TOKENS: [RangeInclusive<u8>; 2] = [0x00..=0x04, 0x07..=0x10];

const CLOCK_PREFIX: u8 = 0xEF;

/// Version byte required to display `tokens`.
///
/// Any two-byte window counts, matching how firmware checks payloads.
#[must_use]
pub fn derive_version(tokens: &[u8]) -> u8 {
    let has = |prefix: u8, pages: &RangeInclusive<u8>| {
        tokens
            .windows(2)
            .any(|pair| pair[0] == prefix && pages.contains(&pair[1]))
    };

    let base = VERSION_RANGES
        .iter()
        .find(|r| has(r.prefix, &r.pages))
        .map_or(0, |r| r.version);

    if CLOCK_TOKENS.iter().any(|pages| has(CLOCK_PREFIX, pages)) {
        base | CLOCK_FLAG
    } else {
        base
    }
}

/// Versions a tokenized entry may legitimately carry.
#[must_use]
pub fn is_known_version(version: u8) -> bool {
    let base = version & !CLOCK_FLAG;
    matches!(base, 0x00..=0x06 | 0x0A..=0x0C)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_extended_tokens() {
        assert_eq!(derive_version(&[]), 0x00);
        assert_eq!(derive_version(&[0xDE, 0x2A, 0x41, 0x2A]), 0x00);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(derive_version(&[0xBB, 0x68]), 0x01);
        assert_eq!(derive_version(&[0xBB, 0xCF]), 0x02);
        assert_eq!(derive_version(&[0xBB, 0xF5]), 0x03);
        assert_eq!(derive_version(&[0xEF, 0x13]), 0x05);
        assert_eq!(derive_version(&[0xEF, 0x41]), 0x0A);
        assert_eq!(derive_version(&[0xEF, 0x97]), 0x0B);
        assert_eq!(derive_version(&[0xEF, 0xA6]), 0x0C);
    }

    #[test]
    fn test_pages_between_ranges() {
        for page in [0x6D, 0x99, 0xA7] {
            assert_eq!(derive_version(&[0xEF, page]), 0x00, "EF {page:02X}");
        }
        assert_eq!(derive_version(&[0xBB, 0xB0]), 0x01);
    }

    #[test]
    fn test_highest_range_wins() {
        assert_eq!(derive_version(&[0xBB, 0x68, 0xEF, 0x98, 0xEF, 0x41]), 0x0B);
    }

    #[test]
    fn test_clock_flag() {
        assert_eq!(derive_version(&[0xEF, 0x00]), 0x24);
        assert_eq!(derive_version(&[0xEF, 0x10]), 0x24);
        assert_eq!(derive_version(&[0xEF, 0x05]), 0x04);
        assert_eq!(derive_version(&[0xEF, 0x97, 0xEF, 0x0F]), 0x2B);
    }

    #[test]
    fn test_known_versions() {
        for version in [0x00, 0x06, 0x0A, 0x0C, 0x20, 0x26, 0x2A, 0x2C] {
            assert!(is_known_version(version), "{version:02X}");
        }
        for version in [0x07, 0x09, 0x0D, 0x10, 0x27, 0x80] {
            assert!(!is_known_version(version), "{version:02X}");
        }
    }
}
