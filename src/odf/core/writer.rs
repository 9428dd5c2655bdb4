//! ODF package writing functionality.
//!
//! [`ArchiveBuilder`] accumulates named entries into a ZIP container in
//! insertion order. It enforces the container-level rules of an ODF
//! package: the `mimetype` marker can only be the very first entry and is
//! always stored uncompressed, entry paths are validated, and each path can
//! be written once.

use super::path::validate_entry_path;
use crate::common::{Error, Result};
use crate::odf::constants::ODF_MIMETYPE;
use std::collections::HashSet;
use std::io::{Cursor, Read, Seek, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

/// Size of the buffer used when streaming entry content from a reader.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Destination of a finished archive.
///
/// `close` is called once, after the ZIP central directory has been written,
/// and is the authoritative signal that the archive reached its storage.
pub trait ArchiveSink: Write + Seek {
    /// Flush and persist everything written so far.
    fn close(self) -> std::io::Result<()>;
}

impl ArchiveSink for Cursor<Vec<u8>> {
    fn close(self) -> std::io::Result<()> {
        Ok(())
    }
}

/// One entry as it was written to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Path of the entry inside the archive
    pub path: String,
    /// Whether the entry was deflated
    pub compressed: bool,
    /// Uncompressed length in bytes
    pub size: u64,
}

/// Builder for ODF packages (ZIP archives).
///
/// # Examples
///
/// ```no_run
/// # use longan::odf::core::ArchiveBuilder;
/// # use longan::Result;
/// # fn example() -> Result<()> {
/// let mut builder = ArchiveBuilder::new();
/// builder.add_entry("mimetype", b"application/vnd.oasis.opendocument.text", false)?;
/// builder.add_entry("content.xml", b"<office:document-content/>", true)?;
///
/// let bytes = builder.finish_to_bytes()?;
/// std::fs::write("document.odt", bytes)?;
/// # Ok(())
/// # }
/// ```
pub struct ArchiveBuilder<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
    entries: Vec<EntryRecord>,
    names: HashSet<String>,
    compression_level: Option<i64>,
}

impl ArchiveBuilder<Cursor<Vec<u8>>> {
    /// Create a new archive builder that writes to memory
    pub fn new() -> Self {
        Self::with_writer(Cursor::new(Vec::new()))
    }

    /// Finish writing and return the bytes
    pub fn finish_to_bytes(self) -> Result<Vec<u8>> {
        let cursor = self.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Seek> ArchiveBuilder<W> {
    /// Create a new archive builder over a custom writer
    pub fn with_writer(writer: W) -> Self {
        Self {
            zip_writer: ZipWriter::new(writer),
            entries: Vec::new(),
            names: HashSet::new(),
            compression_level: None,
        }
    }

    /// Set the Deflate level used for compressed entries (`None` = library default)
    pub fn with_compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }

    /// Add an entry from an in-memory buffer.
    ///
    /// # Arguments
    ///
    /// * `path` - Path within the ZIP archive (e.g., "content.xml", "Pictures/image1.png")
    /// * `content` - Entry content as bytes
    /// * `compressed` - Deflate the entry; ignored for `mimetype`, which is always stored
    pub fn add_entry(&mut self, path: &str, content: &[u8], compressed: bool) -> Result<()> {
        let compressed = self.start_entry(path, compressed)?;
        self.zip_writer.write_all(content)?;
        self.record(path, compressed, content.len() as u64);
        Ok(())
    }

    /// Add an entry by streaming it from a reader.
    ///
    /// The bytes are copied verbatim. Read failures are reported as
    /// [`Error::MediaAccess`] for `path`; write failures keep their own kind.
    pub fn add_entry_from_reader<R: Read + ?Sized>(
        &mut self,
        path: &str,
        reader: &mut R,
        compressed: bool,
    ) -> Result<u64> {
        let compressed = self.start_entry(path, compressed)?;

        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut total = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(Error::MediaAccess {
                        path: path.to_string(),
                        source: e,
                    });
                },
            };
            self.zip_writer.write_all(&buf[..n])?;
            total += n as u64;
        }

        self.record(path, compressed, total);
        Ok(total)
    }

    /// Entries written so far, in archive order.
    pub fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entry has been written yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the central directory and hand back the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the central directory cannot be written. The
    /// archive must then be treated as unusable.
    pub fn finish(self) -> Result<W> {
        let writer = self.zip_writer.finish()?;
        Ok(writer)
    }

    /// Validate `path`, apply the `mimetype` rules and open the ZIP entry.
    /// Returns the compression actually used.
    fn start_entry(&mut self, path: &str, compressed: bool) -> Result<bool> {
        validate_entry_path(path)?;

        if self.names.contains(path) {
            return Err(Error::DuplicateEntry(path.to_string()));
        }

        let is_marker = path == ODF_MIMETYPE;
        if is_marker && !self.entries.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "`{ODF_MIMETYPE}` must be the first archive entry, found after `{}`",
                self.entries[0].path
            )));
        }
        let compressed = compressed && !is_marker;

        // Pinned timestamps keep output byte-identical across runs.
        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        let options = if compressed {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(self.compression_level)
        } else {
            options.compression_method(CompressionMethod::Stored)
        };

        self.zip_writer.start_file(path, options)?;
        Ok(compressed)
    }

    fn record(&mut self, path: &str, compressed: bool, size: u64) {
        self.names.insert(path.to_string());
        self.entries.push(EntryRecord {
            path: path.to_string(),
            compressed,
            size,
        });
    }
}
