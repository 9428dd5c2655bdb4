//! Longan - OpenDocument Text package assembly
//!
//! This library writes conformant OpenDocument Text (`.odt`) packages: a ZIP
//! container whose first entry is the uncompressed `mimetype` marker,
//! followed by embedded media and the deflated XML parts (`content.xml`,
//! `meta.xml`, `styles.xml`, `META-INF/manifest.xml`).
//!
//! # Features
//!
//! - **Capability table**: the part set is a static table; optional parts
//!   (`meta-part`, `styles-part`) are Cargo features
//! - **Pluggable models**: any document type works through the
//!   [`PartGenerator`](odf::odt::PartGenerator) and
//!   [`MediaCollector`](odf::odt::MediaCollector) traits
//! - **Atomic saves**: packages are staged next to the destination and
//!   renamed into place only once complete
//! - **Deterministic output**: identical input gives byte-identical files
//! - **Inspection**: [`PackageReader`](odf::PackageReader) checks a written
//!   package's structure
//!
//! # Example - Saving a text document
//!
//! ```no_run
//! use longan::odf::odt::{PackageAssembler, TextDocument};
//! use longan::common::Metadata;
//!
//! # fn main() -> longan::Result<()> {
//! let mut document = TextDocument::new();
//! document.set_metadata(Metadata {
//!     title: Some("Release notes".to_string()),
//!     ..Default::default()
//! });
//! document.add_heading("Release notes", 1)?;
//! document.add_paragraph("Everything is faster now.");
//!
//! let assembler = PackageAssembler::text()?;
//! assembler.save(Some(&document), Some("notes.odt".as_ref()))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Custom document model
//!
//! ```
//! use longan::odf::odt::{NoMedia, ODT_PARTS, PackageAssembler, PartRegistry, names};
//! use longan::odf::PackageReader;
//! use longan::BoxError;
//!
//! struct Note(String);
//!
//! # fn main() -> longan::Result<()> {
//! let registry = PartRegistry::<Note>::builder(&ODT_PARTS)
//!     .generator(names::MIMETYPE, |_: &Note| -> Result<Vec<u8>, BoxError> {
//!         Ok(b"application/vnd.oasis.opendocument.text".to_vec())
//!     })
//!     .generator(names::CONTENT, |note: &Note| -> Result<Vec<u8>, BoxError> {
//!         Ok(format!("<office:document-content>{}</office:document-content>", note.0).into_bytes())
//!     })
//!     .generator(names::MANIFEST, |_: &Note| -> Result<Vec<u8>, BoxError> {
//!         Ok(br#"<manifest:manifest><manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.text"/><manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/></manifest:manifest>"#.to_vec())
//!     })
//!     .build()?;
//!
//! let assembler = PackageAssembler::new(registry, NoMedia);
//! let bytes = assembler.to_bytes(&Note("hello".to_string()))?;
//!
//! let reader = PackageReader::from_reader(std::io::Cursor::new(bytes))?;
//! reader.verify()?;
//! # Ok(())
//! # }
//! ```

/// Error types, document metadata and XML helpers shared across the crate
pub mod common;

/// OpenDocument package writing
///
/// This module provides the package-assembly engine, the ODT capability
/// table and a reader for inspecting finished packages.
pub mod odf;

// Re-export commonly used types for convenience
pub use common::{BoxError, Error, ErrorKind, Metadata, Result};
pub use odf::odt::{ExportOptions, PackageAssembler};
