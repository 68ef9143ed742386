//! Embedded token data.
//!
//! Token tables are embedded at compile time using `include_str!()`, so the
//! built-in vocabularies need no runtime file access. Each file is one layer;
//! a generation's table is the union of its layers, later layers winning on
//! conflicting codes.
//!
//! The layers carry a representative subset of each vocabulary. Complete
//! tables can be loaded at runtime with
//! [`load_table_from_path`](crate::tokens::load_table_from_path).

use crate::models::TokenSet;

/// One-byte tokens, Y-vars and string vars shared by every generation.
pub const TOKENS_CORE: &str = include_str!("../data/tokens/core.csv");

/// TI-83+/84+ additions: lowercase letters, archive commands, clock commands.
pub const TOKENS_TI84: &str = include_str!("../data/tokens/ti84.csv");

/// TI-84+ C Silver Edition color names.
pub const TOKENS_COLOR: &str = include_str!("../data/tokens/color.csv");

/// CE additions.
pub const TOKENS_CE: &str = include_str!("../data/tokens/ce.csv");

/// Layers making up a token set, oldest first.
#[must_use]
pub fn token_layers(set: TokenSet) -> Vec<(&'static str, &'static str)> {
    let mut layers = vec![("core.csv", TOKENS_CORE)];
    if matches!(set, TokenSet::Ti83 | TokenSet::ColorSe | TokenSet::Ce) {
        layers.push(("ti84.csv", TOKENS_TI84));
    }
    if matches!(set, TokenSet::ColorSe | TokenSet::Ce) {
        layers.push(("color.csv", TOKENS_COLOR));
    }
    if set == TokenSet::Ce {
        layers.push(("ce.csv", TOKENS_CE));
    }
    layers
}
