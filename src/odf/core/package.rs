//! ODF package (ZIP archive) inspection.
//!
//! [`PackageReader`] opens a finished package and checks the structural
//! rules a conforming reader relies on: the `mimetype` marker is the first
//! entry and stored, and the manifest accounts for every other entry.

use super::manifest::Manifest;
use crate::common::{Error, Result};
use crate::odf::constants::{ODF_MANIFEST, ODF_MIMETYPE, is_text_mime_type};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::CompressionMethod;

/// An entry of an opened package, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Path inside the archive
    pub name: String,
    /// Whether the entry is deflated (`false` means stored)
    pub compressed: bool,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// An ODF package opened for inspection
pub struct PackageReader<R> {
    archive: RefCell<zip::ZipArchive<R>>,
    entries: Vec<PackageEntry>,
}

impl PackageReader<BufReader<File>> {
    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> PackageReader<R> {
    /// Open a package from a reader
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|_| Error::InvalidFormat("Invalid ZIP archive".to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                compressed: file.compression() != CompressionMethod::Stored,
                size: file.size(),
            });
        }

        Ok(Self {
            archive: RefCell::new(archive),
            entries,
        })
    }

    /// All entries in archive order
    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Entry names in archive order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Check if a file exists in the package
    pub fn has_file(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == path)
    }

    /// Get a file from the package by path
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::InvalidFormat(format!("File not found: {path}")))?;

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Get the MIME type from the mimetype file
    pub fn mimetype(&self) -> Result<String> {
        let bytes = self.read(ODF_MIMETYPE)?;
        String::from_utf8(bytes)
            .map_err(|_| Error::InvalidFormat("mimetype is not valid UTF-8".to_string()))
    }

    /// Parse META-INF/manifest.xml
    pub fn manifest(&self) -> Result<Manifest> {
        let bytes = self.read(ODF_MANIFEST)?;
        let xml = String::from_utf8(bytes)
            .map_err(|_| Error::InvalidFormat("manifest is not valid UTF-8".to_string()))?;
        Manifest::parse(&xml)
    }

    /// Check the package against the structural rules of an ODF text package.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] naming the first violated rule.
    pub fn verify(&self) -> Result<()> {
        let first = self
            .entries
            .first()
            .ok_or_else(|| Error::InvalidFormat("package is empty".to_string()))?;
        if first.name != ODF_MIMETYPE {
            return Err(Error::InvalidFormat(format!(
                "first entry is `{}`, expected `{ODF_MIMETYPE}`",
                first.name
            )));
        }
        if first.compressed {
            return Err(Error::InvalidFormat(format!("`{ODF_MIMETYPE}` is compressed")));
        }

        let mimetype = self.mimetype()?;
        if !is_text_mime_type(&mimetype) {
            return Err(Error::InvalidFormat(format!(
                "unexpected package MIME type `{mimetype}`"
            )));
        }

        if !self.has_file(ODF_MANIFEST) {
            return Err(Error::InvalidFormat(format!("`{ODF_MANIFEST}` is missing")));
        }
        let manifest = self.manifest()?;
        if manifest.mimetype.as_deref() != Some(mimetype.as_str()) {
            return Err(Error::InvalidFormat(
                "manifest root entry does not match `mimetype`".to_string(),
            ));
        }

        for entry in &self.entries {
            if entry.name == ODF_MIMETYPE || entry.name == ODF_MANIFEST || entry.name.ends_with('/')
            {
                continue;
            }
            if !manifest.has_path(&entry.name) {
                return Err(Error::InvalidFormat(format!(
                    "`{}` is not listed in the manifest",
                    entry.name
                )));
            }
        }

        for path in manifest.paths() {
            if path != "/" && !path.ends_with('/') && !self.has_file(path) {
                return Err(Error::InvalidFormat(format!(
                    "manifest lists `{path}` which is not in the package"
                )));
            }
        }

        Ok(())
    }
}
