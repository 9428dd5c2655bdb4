//! OpenDocument Text (.odt) package assembly.
//!
//! The engine is generic over the document model `D`:
//!
//! - [`PartRegistry`] pairs the ODT capability table ([`ODT_PARTS`]) with one
//!   [`PartGenerator`] per part;
//! - a [`MediaCollector`] enumerates the images to embed;
//! - [`PackageAssembler`] writes the `mimetype` marker, the media and the
//!   remaining parts, and publishes the archive atomically.
//!
//! [`TextDocument`] together with [`PackageAssembler::text`] is a ready-made
//! model for simple documents.
//!
//! # Examples
//!
//! ```no_run
//! use longan::odf::odt::{ExportOptions, MediaScope, PackageAssembler, TextDocument};
//!
//! # fn main() -> longan::Result<()> {
//! let options = ExportOptions::default().with_media_scopes([MediaScope::Section, MediaScope::Header]);
//! let assembler = PackageAssembler::text_with_options(options)?;
//!
//! let mut document = TextDocument::new();
//! document.add_paragraph("Quarterly figures");
//! document.add_image("chart.png", std::fs::read("chart.png")?)?;
//!
//! // no destination: a fresh temp file is created and returned
//! let path = assembler.save(Some(&document), None)?;
//! println!("written to {}", path.display());
//! # Ok(())
//! # }
//! ```

mod assembler;
mod document;
mod media;
mod options;
mod parts;
mod registry;
mod staging;

pub use assembler::PackageAssembler;
pub use document::{Block, Image, TextDocument, TextDocumentMedia};
pub use media::{MediaCollector, MediaEntry, MediaKind, MediaScope, MediaSource, NoMedia};
pub use options::ExportOptions;
#[cfg(feature = "meta-part")]
pub use parts::MetaPart;
#[cfg(feature = "styles-part")]
pub use parts::StylesPart;
pub use parts::{ContentPart, ManifestPart, MimetypePart, text_registry};
pub use registry::{
    ODT_PARTS, PartDescriptor, PartGenerator, PartRegistry, PartRegistryBuilder, PartSlot, names,
};
