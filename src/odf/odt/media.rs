//! Embedded media: what the assembler copies into the package verbatim.
//!
//! A [`MediaCollector`] enumerates the resources a document references for
//! one [`MediaScope`]. Each [`MediaEntry`] names its target path under a
//! media root (`Pictures/` for images) and where its bytes come from.

use crate::common::{Error, Result};
use crate::odf::core::validate_entry_path;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

/// Part of the document a media entry is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaScope {
    /// Body/section content
    Section,
    /// Page headers
    Header,
    /// Page footers
    Footer,
    /// Footnotes and endnotes
    Footnote,
}

/// Kind of embedded resource, which decides its media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MediaKind {
    /// Raster or vector images
    Image,
}

impl MediaKind {
    /// Archive directory (with trailing slash) this kind is stored under.
    pub const fn root(self) -> &'static str {
        match self {
            MediaKind::Image => "Pictures/",
        }
    }

    /// Kind whose root prefixes `archive_path`, if any.
    pub fn of_path(archive_path: &str) -> Option<Self> {
        [MediaKind::Image]
            .into_iter()
            .find(|kind| archive_path.starts_with(kind.root()))
    }
}

/// Where the bytes of a media entry come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Bytes already held in memory
    Bytes(Bytes),
    /// A file on disk, read when the entry is written
    File(PathBuf),
}

impl MediaSource {
    /// Open the source for reading.
    pub fn open(&self) -> std::io::Result<Box<dyn Read + '_>> {
        match self {
            MediaSource::Bytes(bytes) => Ok(Box::new(&bytes[..])),
            MediaSource::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        }
    }
}

impl From<Vec<u8>> for MediaSource {
    fn from(bytes: Vec<u8>) -> Self {
        MediaSource::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for MediaSource {
    fn from(bytes: Bytes) -> Self {
        MediaSource::Bytes(bytes)
    }
}

impl From<PathBuf> for MediaSource {
    fn from(path: PathBuf) -> Self {
        MediaSource::File(path)
    }
}

/// One embedded resource to be copied into the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    archive_path: String,
    source: MediaSource,
}

impl MediaEntry {
    /// Create an entry at an explicit archive path.
    pub fn new(archive_path: impl Into<String>, source: impl Into<MediaSource>) -> Self {
        Self {
            archive_path: archive_path.into(),
            source: source.into(),
        }
    }

    /// Create an entry of `kind` named `file_name` under that kind's root.
    pub fn with_kind(kind: MediaKind, file_name: &str, source: impl Into<MediaSource>) -> Self {
        Self::new(format!("{}{file_name}", kind.root()), source)
    }

    /// Create an image entry stored as `Pictures/<file_name>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::odf::odt::MediaEntry;
    ///
    /// let entry = MediaEntry::image("logo.png", vec![0x89, b'P', b'N', b'G']);
    /// assert_eq!(entry.archive_path(), "Pictures/logo.png");
    /// ```
    pub fn image(file_name: &str, source: impl Into<MediaSource>) -> Self {
        Self::with_kind(MediaKind::Image, file_name, source)
    }

    /// Target path inside the archive
    pub fn archive_path(&self) -> &str {
        &self.archive_path
    }

    /// Byte source of the entry
    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    /// Check the target path is a valid entry path under a media root.
    pub fn validate(&self) -> Result<()> {
        validate_entry_path(&self.archive_path)?;
        match MediaKind::of_path(&self.archive_path) {
            Some(kind) if self.archive_path.len() > kind.root().len() => Ok(()),
            _ => Err(Error::InvalidEntryPath {
                path: self.archive_path.clone(),
                reason: "media must be stored under a media root",
            }),
        }
    }
}

/// Enumerates the media a document references.
///
/// The returned iterator is lazy, finite and consumed exactly once per save.
pub trait MediaCollector<D: ?Sized>: Send + Sync {
    /// Media attached to `scope` of `document`.
    fn collect_media<'a>(
        &'a self,
        document: &'a D,
        scope: MediaScope,
    ) -> Box<dyn Iterator<Item = MediaEntry> + 'a>;
}

/// Collector for documents without embedded media.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl<D: ?Sized> MediaCollector<D> for NoMedia {
    fn collect_media<'a>(
        &'a self,
        _document: &'a D,
        _scope: MediaScope,
    ) -> Box<dyn Iterator<Item = MediaEntry> + 'a> {
        Box::new(std::iter::empty())
    }
}

impl<D: ?Sized, F> MediaCollector<D> for F
where
    F: Fn(&D, MediaScope) -> Vec<MediaEntry> + Send + Sync,
{
    fn collect_media<'a>(
        &'a self,
        document: &'a D,
        scope: MediaScope,
    ) -> Box<dyn Iterator<Item = MediaEntry> + 'a> {
        Box::new(self(document, scope).into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_image_entry_path() {
        let entry = MediaEntry::image("chart 1.svg", b"<svg/>".to_vec());
        assert_eq!(entry.archive_path(), "Pictures/chart 1.svg");
        entry.validate().unwrap();
    }

    #[test]
    fn test_validate_requires_media_root() {
        for path in ["content.xml", "Pictures/", "Thumbnails/thumbnail.png", "/Pictures/a.png"] {
            let entry = MediaEntry::new(path, Vec::<u8>::new());
            let err = entry.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidEntryPath, "{path}");
        }
        MediaEntry::with_kind(MediaKind::Image, "nested/a.png", Vec::<u8>::new())
            .validate()
            .unwrap();
    }

    #[test]
    fn test_open_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"GIF89a").unwrap();

        let source = MediaSource::from(file.path().to_path_buf());
        let mut out = Vec::new();
        source.open().unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"GIF89a");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let source = MediaSource::File(PathBuf::from("/nonexistent/longan/missing.png"));
        assert!(source.open().is_err());
    }

    #[test]
    fn test_closure_collector() {
        let collector = |doc: &Vec<&str>, scope: MediaScope| -> Vec<MediaEntry> {
            if scope != MediaScope::Section {
                return Vec::new();
            }
            doc.iter()
                .map(|name| MediaEntry::image(name, Vec::<u8>::new()))
                .collect()
        };
        let doc = vec!["a.png", "b.png"];

        let paths: Vec<String> = collector
            .collect_media(&doc, MediaScope::Section)
            .map(|entry| entry.archive_path().to_string())
            .collect();
        assert_eq!(paths, ["Pictures/a.png", "Pictures/b.png"]);
        assert_eq!(collector.collect_media(&doc, MediaScope::Header).count(), 0);
        assert_eq!(
            MediaCollector::<Vec<&str>>::collect_media(&NoMedia, &doc, MediaScope::Section).count(),
            0
        );
    }
}
