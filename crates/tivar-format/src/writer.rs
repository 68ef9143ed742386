//! Variable file writer.

use std::io::{BufWriter, Write};

use tivar_standards::Model;

use crate::diagnostics::Diagnostics;
use crate::entry::Entry;
use crate::error::Result;
use crate::header::Header;
use crate::var::TiVar;

/// Variable file writer.
pub struct VarWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> VarWriter<W> {
    /// Create a new writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Write a whole file. The checksum is always recomputed.
    ///
    /// Files whose lengths overflow their 2-byte fields are rejected before
    /// anything is written.
    pub fn write_var(mut self, var: &TiVar) -> Result<()> {
        let bytes = var.try_bytes()?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        tracing::debug!(
            entries = var.entries().len(),
            bytes = var.length(),
            "wrote variable file"
        );
        Ok(())
    }

    /// Wrap a single entry in a file and write it.
    ///
    /// Returns the diagnostics raised while building the container.
    pub fn write_entry(
        self,
        entry: Entry,
        header: Option<Header>,
        model: Option<&'static Model>,
    ) -> Result<Diagnostics> {
        let (var, diagnostics) = entry.export(header, model).into_parts();
        self.write_var(&var)?;
        Ok(diagnostics)
    }
}
