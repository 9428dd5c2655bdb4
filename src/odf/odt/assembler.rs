//! Package assembly.
//!
//! [`PackageAssembler`] turns a document model into an ODF package. It owns
//! the part registry, the media collector and the export options, and is
//! reused across any number of saves.
//!
//! Write order inside the archive:
//!
//! 1. the `mimetype` marker, stored;
//! 2. media entries, scope by scope, in collector order;
//! 3. the remaining enabled parts, in registry order.
//!
//! A save builds the archive in a staging file and publishes it over the
//! destination only after the archive has been closed successfully.

use super::media::{MediaCollector, MediaEntry};
use super::options::ExportOptions;
use super::registry::{PartDescriptor, PartRegistry};
use super::staging::{Staging, StagingSink};
use crate::common::{Error, Result};
use crate::odf::constants::ODF_MIMETYPE;
use crate::odf::core::{ArchiveBuilder, ArchiveSink};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Assembles ODF packages from documents of type `D`.
///
/// # Examples
///
/// ```no_run
/// use longan::odf::odt::{PackageAssembler, TextDocument};
///
/// # fn main() -> longan::Result<()> {
/// let assembler = PackageAssembler::text()?;
///
/// let mut document = TextDocument::new();
/// document.add_heading("Report", 1)?;
/// document.add_paragraph("Hello, World!");
///
/// let path = assembler.save(Some(&document), Some("report.odt".as_ref()))?;
/// assert_eq!(path, std::path::Path::new("report.odt"));
/// # Ok(())
/// # }
/// ```
pub struct PackageAssembler<D: ?Sized> {
    registry: PartRegistry<D>,
    collector: Box<dyn MediaCollector<D>>,
    options: ExportOptions,
}

impl<D: ?Sized> PackageAssembler<D> {
    /// Create an assembler with default options.
    pub fn new(registry: PartRegistry<D>, collector: impl MediaCollector<D> + 'static) -> Self {
        Self::with_options(registry, collector, ExportOptions::default())
    }

    /// Create an assembler with the given options.
    ///
    /// Options are fixed for the lifetime of the assembler because part
    /// generators (such as a manifest) may have been built from them. Parts
    /// named in `options.disabled_parts` are never written, whether or not
    /// the registry already disabled them.
    pub fn with_options(
        registry: PartRegistry<D>,
        collector: impl MediaCollector<D> + 'static,
        options: ExportOptions,
    ) -> Self {
        Self {
            registry,
            collector: Box::new(collector),
            options,
        }
    }

    /// Export options in effect
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Registered parts
    pub fn registry(&self) -> &PartRegistry<D> {
        &self.registry
    }

    /// Assemble `document` and publish it at `destination`.
    ///
    /// Without a destination the package is written to a freshly generated
    /// path in the staging directory (the system temp directory by default),
    /// which is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::UnassignedModel`] if `document` is `None`; nothing is
    ///   touched on disk
    /// - [`Error::MediaAccess`] if a media source cannot be read
    /// - [`Error::PartGeneration`] if a generator fails
    /// - [`Error::ArchiveClose`] if the archive cannot be finalized
    /// - [`Error::Publish`] if the finished file cannot be moved into place
    /// - [`Error::TimedOut`] if the time budget runs out between steps
    ///
    /// On any error no file is published, an existing file at `destination`
    /// keeps its content and the staging file is removed.
    pub fn save(&self, document: Option<&D>, destination: Option<&Path>) -> Result<PathBuf> {
        self.save_with(document, destination, |sink| sink)
    }

    /// [`save`](Self::save) with the staging writer passed through `wrap`.
    pub(crate) fn save_with<W, F>(
        &self,
        document: Option<&D>,
        destination: Option<&Path>,
        wrap: F,
    ) -> Result<PathBuf>
    where
        W: ArchiveSink,
        F: FnOnce(StagingSink) -> W,
    {
        let document = document.ok_or(Error::UnassignedModel)?;
        let deadline = Deadline::start(self.options.time_budget());

        let staging = match destination {
            Some(destination) => Staging::for_destination(destination, &self.options)?,
            None => Staging::generated(&self.options)?,
        };
        tracing::debug!(
            staging = %staging.path().display(),
            destination = %staging.destination().display(),
            "assembling package"
        );

        let builder = ArchiveBuilder::with_writer(wrap(staging.sink()?))
            .with_compression_level(self.options.compression_level);
        let builder = self.assemble(document, builder, &deadline)?;
        deadline.check()?;

        let close_err = |source| Error::ArchiveClose {
            path: staging.destination().to_path_buf(),
            source,
        };
        let sink = builder.finish().map_err(|e| close_err(e.into_io()))?;
        sink.close().map_err(close_err)?;

        let published = staging.publish()?;
        tracing::debug!(path = %published.display(), "package published");
        Ok(published)
    }

    /// Assemble `document` into an arbitrary writer, without staging.
    ///
    /// Ordering and validation are the same as for [`save`](Self::save).
    /// Errors from finalizing the archive are returned as they are.
    pub fn write_to<W: Write + Seek>(&self, document: &D, writer: W) -> Result<W> {
        let deadline = Deadline::start(self.options.time_budget());
        let builder = ArchiveBuilder::with_writer(writer)
            .with_compression_level(self.options.compression_level);
        let builder = self.assemble(document, builder, &deadline)?;
        deadline.check()?;
        builder.finish()
    }

    /// Assemble `document` into memory.
    pub fn to_bytes(&self, document: &D) -> Result<Vec<u8>> {
        let cursor = self.write_to(document, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    fn assemble<W: Write + Seek>(
        &self,
        document: &D,
        mut builder: ArchiveBuilder<W>,
        deadline: &Deadline,
    ) -> Result<ArchiveBuilder<W>> {
        let (markers, parts): (Vec<_>, Vec<_>) = self
            .registry
            .enabled()
            .filter(|part| !self.is_disabled(part.name()))
            .partition(|part| part.archive_path() == ODF_MIMETYPE);

        // The marker goes first even though it is not first in every table.
        for marker in markers {
            write_part(&mut builder, marker, document)?;
        }

        let mut media = 0usize;
        for &scope in &self.options.media_scopes {
            for entry in self.collector.collect_media(document, scope) {
                let size = copy_media(&mut builder, &entry)?;
                tracing::trace!(path = entry.archive_path(), size, ?scope, "media entry copied");
                media += 1;
            }
        }
        tracing::debug!(media, "media copied");
        deadline.check()?;

        for part in parts {
            write_part(&mut builder, part, document)?;
            deadline.check()?;
        }

        Ok(builder)
    }

    fn is_disabled(&self, name: &str) -> bool {
        self.options.disabled_parts.iter().any(|disabled| disabled == name)
    }
}

impl<D: ?Sized> std::fmt::Debug for PackageAssembler<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageAssembler")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn write_part<D: ?Sized, W: Write + Seek>(
    builder: &mut ArchiveBuilder<W>,
    part: &PartDescriptor<D>,
    document: &D,
) -> Result<()> {
    let bytes = part.generate(document)?;
    builder.add_entry(part.archive_path(), &bytes, true)?;
    tracing::trace!(
        part = part.name(),
        path = part.archive_path(),
        optional = part.is_optional(),
        size = bytes.len(),
        "part written"
    );
    Ok(())
}

fn copy_media<W: Write + Seek>(builder: &mut ArchiveBuilder<W>, entry: &MediaEntry) -> Result<u64> {
    entry.validate()?;
    let mut reader = entry.source().open().map_err(|source| Error::MediaAccess {
        path: entry.archive_path().to_string(),
        source,
    })?;
    builder.add_entry_from_reader(entry.archive_path(), reader.as_mut(), true)
}

/// Time budget of one save.
struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn check(&self) -> Result<()> {
        match self.budget {
            Some(budget) if self.started.elapsed() > budget => Err(Error::TimedOut(budget)),
            _ => Ok(()),
        }
    }
}
