//! Calculator model catalog.
//!
//! Every variable file names the family of calculators it was written for
//! through an 8-byte signature. Two families map to a single model; the
//! `**TI83F*` family is shared by every flash-based model and is narrowed
//! down by product id and feature set.
//!
//! | Model                    | Signature  | Product id |
//! |--------------------------|------------|------------|
//! | TI-82                    | `**TI82**` | `00`       |
//! | TI-83                    | `**TI83**` | `00`       |
//! | TI-82A                   | `**TI83F*` | `0B`       |
//! | TI-82+                   | `**TI83F*` | `04`       |
//! | TI-83+                   | `**TI83F*` | `04`       |
//! | TI-84+                   | `**TI83F*` | `0A`       |
//! | TI-84+T                  | `**TI83F*` | `1B`       |
//! | TI-84+CSE                | `**TI83F*` | `0F`       |
//! | TI-84+CE                 | `**TI83F*` | `13`       |
//! | TI-84+CE Python          | `**TI83F*` | `13`       |
//! | TI-83 Premium CE         | `**TI83F*` | `13`       |
//! | TI-83 Premium CE Python  | `**TI83F*` | `13`       |
//! | TI-82 Advanced Ed. Python| `**TI83F*` | `00`       |

use std::fmt;
use std::ops::BitOr;

use crate::error::{Result, StandardsError};

/// Length of a file signature in bytes.
pub const SIGNATURE_LEN: usize = 8;

/// File signature family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// `**TI82**`
    Ti82,
    /// `**TI83**`
    Ti83,
    /// `**TI83F*`, shared by all flash models.
    Ti83F,
}

impl Signature {
    /// All signature families.
    pub const ALL: [Signature; 3] = [Self::Ti82, Self::Ti83, Self::Ti83F];

    /// On-disk bytes of the signature.
    #[must_use]
    pub const fn bytes(self) -> &'static [u8; SIGNATURE_LEN] {
        match self {
            Self::Ti82 => b"**TI82**",
            Self::Ti83 => b"**TI83**",
            Self::Ti83F => b"**TI83F*",
        }
    }

    /// Match raw signature bytes against the known families.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|sig| sig.bytes() == bytes)
    }

    /// Extension prefix used by files of this family (`82`, `83` or `8x`).
    #[must_use]
    pub const fn extension_prefix(self) -> &'static str {
        match self {
            Self::Ti82 => "82",
            Self::Ti83 => "83",
            Self::Ti83F => "8x",
        }
    }

    /// Whether a single model owns this signature.
    #[must_use]
    pub const fn is_shared(self) -> bool {
        matches!(self, Self::Ti83F)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.bytes()))
    }
}

/// Capability flags of a model.
///
/// Ordered by raw value, so a model with more (or later) capabilities sorts
/// after one with fewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Features(u16);

impl Features {
    pub const NONE: Features = Features(0);
    pub const FLASH: Features = Features(1 << 0);
    pub const APPS: Features = Features(1 << 1);
    pub const CLOCK: Features = Features(1 << 2);
    pub const COLOR: Features = Features(1 << 3);
    pub const EZ80: Features = Features(1 << 4);
    pub const EXACT_MATH: Features = Features(1 << 5);
    pub const PYTHON: Features = Features(1 << 6);

    /// Raw bit value.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }

    const fn with(self, other: Features) -> Features {
        Features(self.0 | other.0)
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        self.with(rhs)
    }
}

/// Token vocabulary generation used by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSet {
    /// TI-82 vocabulary.
    Ti82,
    /// TI-83 / TI-83+ / TI-84+ monochrome vocabulary.
    Ti83,
    /// TI-84+ C Silver Edition vocabulary (adds colors).
    ColorSe,
    /// eZ80 CE vocabulary.
    Ce,
}

impl TokenSet {
    /// All token sets, oldest first.
    pub const ALL: [TokenSet; 4] = [Self::Ti82, Self::Ti83, Self::ColorSe, Self::Ce];
}

/// A calculator model.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Model {
    /// Display name.
    pub name: &'static str,
    /// Signature family written into file headers.
    pub signature: Signature,
    /// Product id written into file headers.
    pub product_id: u8,
    /// Capability flags.
    pub features: Features,
    /// Token vocabulary.
    pub token_set: TokenSet,
}

impl Model {
    /// Whether entries written for this model carry flash bytes.
    #[must_use]
    pub const fn has_flash(&self) -> bool {
        self.features.contains(Features::FLASH)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

const MONO_FLASH: Features = Features::FLASH.with(Features::APPS);
const MONO_CLOCK: Features = MONO_FLASH.with(Features::CLOCK);
const COLOR: Features = MONO_CLOCK.with(Features::COLOR);
const CE: Features = COLOR.with(Features::EZ80);

pub static TI_82: Model = Model {
    name: "TI-82",
    signature: Signature::Ti82,
    product_id: 0x00,
    features: Features::NONE,
    token_set: TokenSet::Ti82,
};

pub static TI_83: Model = Model {
    name: "TI-83",
    signature: Signature::Ti83,
    product_id: 0x00,
    features: Features::NONE,
    token_set: TokenSet::Ti83,
};

pub static TI_82A: Model = Model {
    name: "TI-82A",
    signature: Signature::Ti83F,
    product_id: 0x0B,
    features: Features::FLASH,
    token_set: TokenSet::Ti83,
};

pub static TI_82P: Model = Model {
    name: "TI-82+",
    signature: Signature::Ti83F,
    product_id: 0x04,
    features: Features::FLASH,
    token_set: TokenSet::Ti83,
};

pub static TI_83P: Model = Model {
    name: "TI-83+",
    signature: Signature::Ti83F,
    product_id: 0x04,
    features: MONO_FLASH,
    token_set: TokenSet::Ti83,
};

pub static TI_84P: Model = Model {
    name: "TI-84+",
    signature: Signature::Ti83F,
    product_id: 0x0A,
    features: MONO_CLOCK,
    token_set: TokenSet::Ti83,
};

pub static TI_84T: Model = Model {
    name: "TI-84+T",
    signature: Signature::Ti83F,
    product_id: 0x1B,
    features: MONO_CLOCK,
    token_set: TokenSet::Ti83,
};

pub static TI_84PCSE: Model = Model {
    name: "TI-84+CSE",
    signature: Signature::Ti83F,
    product_id: 0x0F,
    features: COLOR,
    token_set: TokenSet::ColorSe,
};

pub static TI_84PCE: Model = Model {
    name: "TI-84+CE",
    signature: Signature::Ti83F,
    product_id: 0x13,
    features: CE,
    token_set: TokenSet::Ce,
};

pub static TI_84PCEPY: Model = Model {
    name: "TI-84+CE Python",
    signature: Signature::Ti83F,
    product_id: 0x13,
    features: CE.with(Features::PYTHON),
    token_set: TokenSet::Ce,
};

pub static TI_83PCE: Model = Model {
    name: "TI-83 Premium CE",
    signature: Signature::Ti83F,
    product_id: 0x13,
    features: CE.with(Features::EXACT_MATH),
    token_set: TokenSet::Ce,
};

pub static TI_83PCEEP: Model = Model {
    name: "TI-83 Premium CE Python",
    signature: Signature::Ti83F,
    product_id: 0x13,
    features: CE.with(Features::EXACT_MATH).with(Features::PYTHON),
    token_set: TokenSet::Ce,
};

pub static TI_82AEP: Model = Model {
    name: "TI-82 Advanced Edition Python",
    signature: Signature::Ti83F,
    product_id: 0x00,
    features: Features::FLASH
        .with(Features::CLOCK)
        .with(Features::COLOR)
        .with(Features::EZ80)
        .with(Features::PYTHON),
    token_set: TokenSet::Ce,
};

/// All built-in models, in release order.
pub static MODELS: [&Model; 13] = [
    &TI_82,
    &TI_83,
    &TI_82A,
    &TI_82P,
    &TI_83P,
    &TI_84P,
    &TI_84T,
    &TI_84PCSE,
    &TI_84PCE,
    &TI_84PCEPY,
    &TI_83PCE,
    &TI_83PCEEP,
    &TI_82AEP,
];

/// A source of model definitions.
///
/// The header codec only reads `signature`, `product_id` and `features`
/// from the models it is given.
pub trait ModelCatalog {
    /// Every model known to this catalog.
    fn models(&self) -> &[&'static Model];

    /// Models sharing a signature.
    fn with_signature(&self, signature: Signature) -> Vec<&'static Model> {
        self.models()
            .iter()
            .copied()
            .filter(|model| model.signature == signature)
            .collect()
    }

    /// Look a model up by name (case-insensitive, `+` may be spelled `p`).
    fn find(&self, name: &str) -> Result<&'static Model> {
        let wanted = normalize_name(name);
        self.models()
            .iter()
            .copied()
            .find(|model| normalize_name(model.name) == wanted)
            .ok_or_else(|| StandardsError::UnknownModel {
                name: name.to_string(),
            })
    }
}

/// The catalog compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl ModelCatalog for BuiltinCatalog {
    fn models(&self) -> &[&'static Model] {
        &MODELS
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | ' ' | '_'))
        .map(|c| if c == '+' { 'p' } else { c.to_ascii_lowercase() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_roundtrip() {
        for sig in Signature::ALL {
            assert_eq!(Signature::from_bytes(sig.bytes()), Some(sig));
        }
        assert_eq!(Signature::from_bytes(b"**TI85**"), None);
    }

    #[test]
    fn test_features_ordering() {
        assert!(TI_84PCE.features > TI_84PCSE.features);
        assert!(TI_84PCSE.features > TI_84P.features);
        assert!(TI_83PCEEP.features > TI_84PCEPY.features);
        assert!(TI_83PCEEP.features.contains(Features::PYTHON));
    }

    #[test]
    fn test_find_by_name() {
        let catalog = BuiltinCatalog;
        assert_eq!(catalog.find("TI-84+CE").unwrap(), &TI_84PCE);
        assert_eq!(catalog.find("ti84pce").unwrap(), &TI_84PCE);
        assert_eq!(catalog.find("TI-83").unwrap(), &TI_83);
        assert!(catalog.find("TI-89").is_err());
    }

    #[test]
    fn test_shared_signature_members() {
        let shared = BuiltinCatalog.with_signature(Signature::Ti83F);
        assert_eq!(shared.len(), 11);
        assert!(shared.iter().all(|m| m.has_flash()));
        assert_eq!(BuiltinCatalog.with_signature(Signature::Ti82), vec![&TI_82]);
    }
}
