//! The 53-byte file header.
//!
//! | Offset | Size | Field        |
//! |--------|------|--------------|
//! | 0      | 8    | signature    |
//! | 8      | 2    | extra        |
//! | 10     | 1    | product id   |
//! | 11     | 42   | comment      |

use tivar_standards::{Model, ModelCatalog, Signature};

use crate::cursor::ByteCursor;
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location, Parsed, Section};
use crate::entry::Entry;
use crate::options::HeaderOptions;
use crate::var::TiVar;

/// Header length in bytes.
pub const HEADER_LEN: usize = 53;

/// Comment field length in bytes.
pub const COMMENT_LEN: usize = 42;

/// File header.
///
/// Every field is kept as raw bytes so that unknown signatures, tool-specific
/// extra bytes and comment padding survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    magic: [u8; 8],
    extra: [u8; 2],
    product_id: u8,
    comment: [u8; COMMENT_LEN],
}

impl Default for Header {
    fn default() -> Self {
        Self::new(&HeaderOptions::default())
    }
}

impl Header {
    /// Build a header from options.
    #[must_use]
    pub fn new(options: &HeaderOptions) -> Self {
        let mut header = Self {
            magic: *options.model.signature.bytes(),
            extra: options.extra,
            product_id: options.product_id.unwrap_or(options.model.product_id),
            comment: [0; COMMENT_LEN],
        };
        header.set_comment(&options.comment);
        header
    }

    /// Default header for a model.
    #[must_use]
    pub fn for_model(model: &'static Model) -> Self {
        Self::new(&HeaderOptions::new().model(model))
    }

    /// Parse the first 53 bytes of `bytes`.
    ///
    /// Short input is zero-filled and reported as truncated.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Parsed<Header> {
        let mut diagnostics = Diagnostics::new();
        let mut cursor = ByteCursor::new(bytes, Section::Header);
        let header = Self::read(&mut cursor, &mut diagnostics);
        Parsed::new(header, diagnostics)
    }

    pub(crate) fn read(cursor: &mut ByteCursor<'_>, diagnostics: &mut Diagnostics) -> Header {
        Header {
            magic: cursor.array("magic", diagnostics),
            extra: cursor.array("extra", diagnostics),
            product_id: cursor.u8("product_id", diagnostics),
            comment: cursor.array("comment", diagnostics),
        }
    }

    /// Serialize the header.
    #[must_use]
    pub fn bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..8].copy_from_slice(&self.magic);
        out[8..10].copy_from_slice(&self.extra);
        out[10] = self.product_id;
        out[11..].copy_from_slice(&self.comment);
        out
    }

    /// Raw signature bytes.
    #[must_use]
    pub fn magic(&self) -> &[u8; 8] {
        &self.magic
    }

    /// Signature family, if the signature is known.
    #[must_use]
    pub fn signature(&self) -> Option<Signature> {
        Signature::from_bytes(&self.magic)
    }

    pub fn set_signature(&mut self, signature: Signature) {
        self.magic = *signature.bytes();
    }

    #[must_use]
    pub fn extra(&self) -> [u8; 2] {
        self.extra
    }

    pub fn set_extra(&mut self, extra: [u8; 2]) {
        self.extra = extra;
    }

    #[must_use]
    pub fn product_id(&self) -> u8 {
        self.product_id
    }

    pub fn set_product_id(&mut self, product_id: u8) {
        self.product_id = product_id;
    }

    /// Comment text up to the first NUL.
    #[must_use]
    pub fn comment(&self) -> String {
        let end = self
            .comment
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(COMMENT_LEN);
        String::from_utf8_lossy(&self.comment[..end]).into_owned()
    }

    /// Replace the comment, truncating to 42 bytes and zero-padding.
    pub fn set_comment(&mut self, comment: &str) {
        self.comment = [0; COMMENT_LEN];
        let mut end = comment.len().min(COMMENT_LEN);
        while !comment.is_char_boundary(end) {
            end -= 1;
        }
        self.comment[..end].copy_from_slice(&comment.as_bytes()[..end]);
    }

    /// Resolve the model this header was written for.
    ///
    /// Single-model signatures resolve directly. The shared `**TI83F*`
    /// family is narrowed to its members with a matching product id (all of
    /// them when the id is zero), and the one with the greatest feature set
    /// wins; later catalog entries win ties.
    #[must_use]
    pub fn derive_model(&self, catalog: &dyn ModelCatalog) -> Parsed<Option<&'static Model>> {
        let mut diagnostics = Diagnostics::new();

        let Some(signature) = self.signature() else {
            diagnostics.report(
                DiagnosticCode::UnknownSignature,
                Location::header("magic"),
                format!(
                    "expected one of **TI82**, **TI83**, **TI83F*, got {:?} ({})",
                    String::from_utf8_lossy(&self.magic),
                    hex::encode_upper(self.magic)
                ),
            );
            return Parsed::new(None, diagnostics);
        };

        let candidates = catalog.with_signature(signature);
        let model = if signature.is_shared() {
            candidates
                .into_iter()
                .filter(|m| self.product_id == 0 || m.product_id == self.product_id)
                .max_by_key(|m| m.features)
        } else {
            candidates.into_iter().next()
        };

        if model.is_none() {
            diagnostics.report(
                DiagnosticCode::UnknownProductId,
                Location::header("product_id"),
                format!(
                    "no {signature} model has product id {:02X}",
                    self.product_id
                ),
            );
        }
        Parsed::new(model, diagnostics)
    }

    /// Wrap entries in a container using this header.
    ///
    /// The container's model is derived from the header.
    pub fn with_entries(self, entries: impl IntoIterator<Item = Entry>) -> Parsed<TiVar> {
        let (model, mut diagnostics) = self
            .derive_model(&tivar_standards::BuiltinCatalog)
            .into_parts();
        let (mut var, created) = TiVar::new(self, model).into_parts();
        diagnostics.extend(created);
        for entry in entries {
            diagnostics.extend(var.add_entry(entry));
        }
        Parsed::new(var, diagnostics)
    }
}
