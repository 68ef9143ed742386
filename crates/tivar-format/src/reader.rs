//! Variable file reader.
//!
//! Reads whole files or single entries from any [`Read`] source.

use std::io::{BufReader, Read};

use crate::diagnostics::Parsed;
use crate::entry::Entry;
use crate::error::{Result, VarError};
use crate::options::ReadOptions;
use crate::var::{TiVar, load_entry_at, load_single_entry};

/// Variable file reader.
pub struct VarReader<R: Read> {
    reader: BufReader<R>,
    options: ReadOptions,
}

impl<R: Read> VarReader<R> {
    /// Create a new reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: ReadOptions::default(),
        }
    }

    /// Create a new reader with options.
    pub fn with_options(reader: R, options: ReadOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read and parse the whole file.
    pub fn read_var(mut self) -> Result<Parsed<TiVar>> {
        let data = self.read_all_bytes()?;
        TiVar::load(&data, &self.options)
    }

    /// Read only the entry at `index`.
    pub fn read_entry(mut self, index: usize) -> Result<Parsed<Entry>> {
        let data = self.read_all_bytes()?;
        self.finish(load_entry_at(&data, index)?)
    }

    /// Read the first entry, reporting any that follow.
    pub fn read_single_entry(mut self) -> Result<Parsed<Entry>> {
        let data = self.read_all_bytes()?;
        self.finish(load_single_entry(&data)?)
    }

    fn finish(&self, parsed: Parsed<Entry>) -> Result<Parsed<Entry>> {
        if self.options.strict && parsed.diagnostics.warning_count() > 0 {
            return Err(VarError::Rejected(parsed.diagnostics));
        }
        Ok(parsed)
    }

    fn read_all_bytes(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}
