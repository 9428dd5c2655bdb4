//! Staging files for save-then-publish.
//!
//! The archive is built in a temporary file next to the destination and
//! renamed over it only once the archive is complete. The staging file is a
//! [`NamedTempFile`], so every exit path that does not publish it (errors,
//! early returns, unwinding) deletes it on drop.

use super::options::ExportOptions;
use crate::common::{Error, Result};
use crate::odf::core::ArchiveSink;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile, TempPath};

const STAGING_PREFIX: &str = ".~longan-";
const STAGING_SUFFIX: &str = ".tmp";

/// Staging file owned by one in-flight save.
#[derive(Debug)]
pub(crate) struct Staging {
    file: NamedTempFile,
    destination: PathBuf,
    /// Placeholder holding a generated destination name until publish.
    reserved: Option<TempPath>,
    sync: bool,
}

impl Staging {
    /// Stage for an explicit destination.
    pub(crate) fn for_destination(destination: &Path, options: &ExportOptions) -> Result<Self> {
        let dir = match &options.staging_dir {
            Some(dir) => dir.clone(),
            None => parent_dir(destination).to_path_buf(),
        };
        let file = Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&dir)?;

        Ok(Self {
            file,
            destination: destination.to_path_buf(),
            reserved: None,
            sync: options.sync_on_close,
        })
    }

    /// Stage for a freshly generated destination.
    ///
    /// The destination name is reserved with an empty placeholder file and
    /// the archive is staged in a separate file beside it. The placeholder
    /// is removed again if the save does not publish.
    pub(crate) fn generated(options: &ExportOptions) -> Result<Self> {
        let dir = options
            .staging_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let reserved = Builder::new()
            .prefix(&options.temp_prefix)
            .suffix(".odt")
            .tempfile_in(&dir)?
            .into_temp_path();
        let file = Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&dir)?;

        Ok(Self {
            file,
            destination: reserved.to_path_buf(),
            reserved: Some(reserved),
            sync: options.sync_on_close,
        })
    }

    /// Path of the staging file
    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }

    /// Final destination of the archive
    pub(crate) fn destination(&self) -> &Path {
        &self.destination
    }

    /// Writer over the staging file for the archive builder.
    pub(crate) fn sink(&self) -> Result<StagingSink> {
        let file = self.file.as_file().try_clone()?;
        Ok(StagingSink {
            writer: BufWriter::new(file),
            sync: self.sync,
        })
    }

    /// Move the finished staging file to the destination.
    pub(crate) fn publish(self) -> Result<PathBuf> {
        let Self {
            file,
            destination,
            reserved,
            sync,
        } = self;

        match file.persist(&destination) {
            Ok(_) => {},
            Err(e) if e.error.kind() == std::io::ErrorKind::CrossesDevices => {
                tracing::debug!(
                    destination = %destination.display(),
                    "staging directory is on another filesystem, copying"
                );
                let mut staged = e.file;
                publish_by_copy(staged.as_file_mut(), &destination, sync)?;
            },
            Err(e) => {
                return Err(Error::Publish {
                    path: destination,
                    source: e.error,
                });
            },
        }

        // The published archive now sits at the reserved path.
        if let Some(reserved) = reserved {
            reserved.keep().map_err(|e| Error::Publish {
                path: destination.clone(),
                source: e.error,
            })?;
        }
        Ok(destination)
    }
}

/// Copy into a second temp file beside `destination`, then rename it over.
fn publish_by_copy(staged: &mut File, destination: &Path, sync: bool) -> Result<()> {
    let publish_err = |source: std::io::Error| Error::Publish {
        path: destination.to_path_buf(),
        source,
    };

    let mut local = Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(parent_dir(destination))
        .map_err(publish_err)?;

    staged.seek(SeekFrom::Start(0)).map_err(publish_err)?;
    std::io::copy(staged, local.as_file_mut()).map_err(publish_err)?;
    if sync {
        local.as_file().sync_all().map_err(publish_err)?;
    }
    local.persist(destination).map_err(|e| publish_err(e.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Buffered writer over the staging file.
pub(crate) struct StagingSink {
    writer: BufWriter<File>,
    sync: bool,
}

impl Write for StagingSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Seek for StagingSink {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.writer.seek(pos)
    }
}

impl ArchiveSink for StagingSink {
    fn close(self) -> std::io::Result<()> {
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_publish_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.odt");
        std::fs::write(&destination, b"old").unwrap();

        let staging = Staging::for_destination(&destination, &ExportOptions::default()).unwrap();
        assert_eq!(staging.path().parent(), Some(dir.path()));
        let mut sink = staging.sink().unwrap();
        sink.write_all(b"new archive").unwrap();
        sink.close().unwrap();

        // destination untouched until publish
        assert_eq!(std::fs::read(&destination).unwrap(), b"old");

        let published = staging.publish().unwrap();
        assert_eq!(published, destination);
        assert_eq!(std::fs::read(&destination).unwrap(), b"new archive");
        assert_eq!(dir_entries(dir.path()), ["out.odt"]);
    }

    #[test]
    fn test_drop_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.odt");

        let staging = Staging::for_destination(&destination, &ExportOptions::default()).unwrap();
        let staged = staging.path().to_path_buf();
        assert!(staged.exists());
        drop(staging);

        assert!(!staged.exists());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_generated_destination_staged_separately() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            staging_dir: Some(dir.path().to_path_buf()),
            temp_prefix: "report-".to_string(),
            ..Default::default()
        };

        let staging = Staging::generated(&options).unwrap();
        assert_ne!(staging.path(), staging.destination());
        assert_eq!(staging.path().parent(), Some(dir.path()));

        let mut sink = staging.sink().unwrap();
        sink.write_all(b"archive").unwrap();
        sink.close().unwrap();
        // only the empty placeholder is visible at the destination
        assert_eq!(std::fs::read(staging.destination()).unwrap(), b"");

        let published = staging.publish().unwrap();
        let name = published.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report-") && name.ends_with(".odt"), "{name}");
        assert_eq!(std::fs::read(&published).unwrap(), b"archive");
        assert_eq!(dir_entries(dir.path()), [name]);
    }

    #[test]
    fn test_unpublished_generated_destination_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            staging_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let staging = Staging::generated(&options).unwrap();
        assert_eq!(dir_entries(dir.path()).len(), 2);
        drop(staging);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_publish_by_copy() {
        let staging_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let destination = dest_dir.path().join("copied.odt");

        let mut staged = tempfile::tempfile_in(staging_dir.path()).unwrap();
        staged.write_all(b"payload").unwrap();
        publish_by_copy(&mut staged, &destination, true).unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"payload");
        assert_eq!(dir_entries(dest_dir.path()), ["copied.odt"]);
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("out.odt")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/tmp/out.odt")), Path::new("/tmp"));
    }
}
