//! ODF manifest parsing functionality.
//!
//! The manifest.xml file lists every file in the ODF package together with
//! its media type. The root entry (`/`) carries the package MIME type.

use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

/// ODF manifest (META-INF/manifest.xml)
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// MIME type of the root entry, if the manifest has one
    pub mimetype: Option<String>,
    /// File entries in document order
    pub entries: Vec<ManifestEntry>,
}

/// Entry in the ODF manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub full_path: String,
    pub media_type: String,
}

impl Manifest {
    /// Parse manifest XML content
    pub fn parse(xml_content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml_content);
        let mut buf = Vec::new();
        let mut entries = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"manifest:file-entry"
                        && let Some(entry) = Self::parse_file_entry(e, reader.decoder())?
                    {
                        entries.push(entry);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(format!("manifest: {e}"))),
                _ => {},
            }
            buf.clear();
        }

        let mimetype = entries
            .iter()
            .find(|entry| entry.full_path == "/")
            .map(|entry| entry.media_type.clone());

        Ok(Self { mimetype, entries })
    }

    /// Parse a single file-entry element
    fn parse_file_entry(e: &BytesStart, decoder: Decoder) -> Result<Option<ManifestEntry>> {
        let mut full_path = String::new();
        let mut media_type = String::new();

        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|_| Error::InvalidFormat("Invalid attribute in manifest".to_string()))?;
            let value = attr
                .decode_and_unescape_value(decoder)
                .map_err(|_| Error::InvalidFormat("Invalid attribute value in manifest".to_string()))?
                .into_owned();

            match attr.key.as_ref() {
                b"manifest:full-path" => full_path = value,
                b"manifest:media-type" => media_type = value,
                _ => {},
            }
        }

        if full_path.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ManifestEntry {
                full_path,
                media_type,
            }))
        }
    }

    /// Get media type for a path
    pub fn get_media_type(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.full_path == path)
            .map(|entry| entry.media_type.as_str())
    }

    /// Check if a path exists in manifest
    pub fn has_path(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.full_path == path)
    }

    /// Get all paths in manifest, in document order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.full_path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
  <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.text" manifest:version="1.2"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="Pictures/R&amp;D.png" manifest:media-type="image/png"/>
</manifest:manifest>
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(
            manifest.mimetype.as_deref(),
            Some("application/vnd.oasis.opendocument.text")
        );
        assert_eq!(manifest.entries.len(), 3);
        assert_eq!(manifest.get_media_type("content.xml"), Some("text/xml"));
        assert!(manifest.has_path("Pictures/R&D.png"));
        assert!(!manifest.has_path("styles.xml"));
        assert_eq!(
            manifest.paths().collect::<Vec<_>>(),
            ["/", "content.xml", "Pictures/R&D.png"]
        );
    }

    #[test]
    fn test_parse_malformed_manifest() {
        let err = Manifest::parse("<manifest:manifest></manifest:other>").unwrap_err();
        assert!(matches!(err, Error::XmlError(_)));
    }
}
