//! ZIP packaging for multi-file outputs (split pages, rendered images).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ConversionError;

/// Streams named entries into a ZIP file on disk.
pub struct ArchiveWriter {
    inner: ZipWriter<File>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ArchiveWriter {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: &Path) -> Result<Self, ConversionError> {
        let file = File::create(path)?;
        Ok(Self {
            inner: ZipWriter::new(file),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            entries: 0,
        })
    }

    /// Append one entry.
    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<(), ConversionError> {
        self.inner.start_file(name, self.options)?;
        self.inner.write_all(data)?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether no entry has been written.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Write the central directory and flush.
    pub fn finish(self) -> Result<usize, ConversionError> {
        let mut file = self.inner.finish()?;
        file.flush()?;
        Ok(self.entries)
    }
}
