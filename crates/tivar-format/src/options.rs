//! Options for reading files and constructing headers and entries.

use tivar_standards::Model;
use tivar_standards::models::TI_82AEP;

/// Comment written into new headers.
pub const DEFAULT_COMMENT: &str = "Created with tivar";

/// Reserved header bytes written by most export tools.
pub const DEFAULT_EXTRA: [u8; 2] = [0x1A, 0x0A];

/// Options for reading variable files.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Reject the file if any warning is recorded.
    pub strict: bool,
    /// Model the file is expected to come from.
    pub expected_model: Option<&'static Model>,
}

impl ReadOptions {
    /// Create reader options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict validation.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Warn if the header names a different model.
    #[must_use]
    pub fn expected_model(mut self, model: &'static Model) -> Self {
        self.expected_model = Some(model);
        self
    }
}

/// Field values for a new header.
#[derive(Debug, Clone)]
pub struct HeaderOptions {
    /// Model supplying the signature and product id.
    pub model: &'static Model,
    /// Product id override.
    pub product_id: Option<u8>,
    /// Reserved bytes, preserved verbatim.
    pub extra: [u8; 2],
    /// Comment text, truncated to 42 bytes.
    pub comment: String,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            model: &TI_82AEP,
            product_id: None,
            extra: DEFAULT_EXTRA,
            comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

impl HeaderOptions {
    /// Create header options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target model.
    #[must_use]
    pub fn model(mut self, model: &'static Model) -> Self {
        self.model = model;
        self
    }

    /// Set an explicit product id.
    #[must_use]
    pub fn product_id(mut self, product_id: u8) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Set the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Construction parameters of an entry.
#[derive(Debug, Clone)]
pub struct EntryOptions {
    /// Use the flash layout (meta length 13). Default: true.
    pub for_flash: bool,
    /// Display name; each kind has its own default.
    pub name: Option<String>,
    /// Version byte, flash layout only.
    pub version: Option<u8>,
    /// Archived flag, flash layout only.
    pub archived: Option<bool>,
    /// Initial data section.
    pub data: Option<Vec<u8>>,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            for_flash: true,
            name: None,
            version: None,
            archived: None,
            data: None,
        }
    }
}

impl EntryOptions {
    /// Create entry options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options matching a model's layout.
    #[must_use]
    pub fn for_model(model: &Model) -> Self {
        Self {
            for_flash: model.has_flash(),
            ..Self::default()
        }
    }

    /// Use the flashless layout (meta length 11).
    #[must_use]
    pub fn flashless(mut self) -> Self {
        self.for_flash = false;
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the version byte.
    #[must_use]
    pub fn version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the archived flag.
    #[must_use]
    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    /// Set the initial data section.
    #[must_use]
    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }
}
