//! OpenDocument package writing.

/// MIME types, part paths and media types
pub mod constants;
/// Container-level building blocks: entry paths, archive writing, inspection
pub mod core;
/// OpenDocument Text (.odt) package assembly
pub mod odt;

/// Re-export the main APIs
pub use core::{ArchiveBuilder, PackageReader};
pub use odt::{ExportOptions, PackageAssembler, TextDocument};
