//! Container-level ODF functionality.
//!
//! This module owns everything that is about the ZIP package rather than
//! the XML inside it: writing entries in order with the right compression,
//! validating entry paths, and reading a finished package back for
//! inspection.

/// ODF manifest parsing
mod manifest;
/// ODF package inspection
mod package;
/// Archive entry path rules
mod path;
/// ODF package writing
mod writer;

pub use manifest::{Manifest, ManifestEntry};
pub use package::{PackageEntry, PackageReader};
pub use path::validate_entry_path;
pub use writer::{ArchiveBuilder, ArchiveSink, EntryRecord};
