//! Unified error types for Longan.
//!
//! Every failure during a save is terminal for that call and surfaces as one
//! [`Error`] value. [`Error::kind`] gives a fieldless discriminant for callers
//! that only need to branch on the category.
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Boxed error produced by external collaborators such as part generators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No document model was bound to the save call
    #[error("Document model unassigned")]
    UnassignedModel,

    /// A referenced media source could not be read
    #[error("Could not read media source for `{path}`: {source}")]
    MediaAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A part generator failed to produce content
    #[error("Could not generate part `{part}`: {source}")]
    PartGeneration {
        part: String,
        #[source]
        source: BoxError,
    },

    /// The archive could not be finalized
    #[error("Could not close archive file `{}`: {source}", path.display())]
    ArchiveClose {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finalized staging file could not be moved to its destination
    #[error("Could not publish archive file `{}`: {source}", path.display())]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive entry path is not a relative forward-slash path
    #[error("Invalid entry path `{path}`: {reason}")]
    InvalidEntryPath { path: String, reason: &'static str },

    /// Two entries were written under the same archive path
    #[error("Duplicate archive entry `{0}`")]
    DuplicateEntry(String),

    /// A mandatory part has no generator in this build
    #[error("Mandatory part `{0}` has no generator")]
    MissingMandatoryPart(String),

    /// A part name or archive path appears twice in the capability table
    #[error("Part `{0}` is registered more than once")]
    DuplicatePart(String),

    /// A generator or setting refers to a part that is not in the table
    #[error("Unknown part `{0}`")]
    UnknownPart(String),

    /// The save exceeded its configured time budget
    #[error("Export exceeded its time budget of {0:?}")]
    TimedOut(Duration),

    /// Export options could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Fieldless discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnassignedModel,
    MediaAccess,
    PartGeneration,
    ArchiveClose,
    Publish,
    InvalidEntryPath,
    DuplicateEntry,
    MissingMandatoryPart,
    DuplicatePart,
    UnknownPart,
    TimedOut,
    Config,
    Io,
    Zip,
    Xml,
    InvalidFormat,
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnassignedModel => ErrorKind::UnassignedModel,
            Error::MediaAccess { .. } => ErrorKind::MediaAccess,
            Error::PartGeneration { .. } => ErrorKind::PartGeneration,
            Error::ArchiveClose { .. } => ErrorKind::ArchiveClose,
            Error::Publish { .. } => ErrorKind::Publish,
            Error::InvalidEntryPath { .. } => ErrorKind::InvalidEntryPath,
            Error::DuplicateEntry(_) => ErrorKind::DuplicateEntry,
            Error::MissingMandatoryPart(_) => ErrorKind::MissingMandatoryPart,
            Error::DuplicatePart(_) => ErrorKind::DuplicatePart,
            Error::UnknownPart(_) => ErrorKind::UnknownPart,
            Error::TimedOut(_) => ErrorKind::TimedOut,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
            Error::ZipError(_) => ErrorKind::Zip,
            Error::XmlError(_) => ErrorKind::Xml,
            Error::InvalidFormat(_) => ErrorKind::InvalidFormat,
        }
    }

    /// Flatten into an [`std::io::Error`], keeping the original one when present.
    pub(crate) fn into_io(self) -> std::io::Error {
        match self {
            Error::Io(e) => e,
            other => std::io::Error::other(other.to_string()),
        }
    }
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::UnassignedModel.to_string(), "Document model unassigned");

        let err = Error::ArchiveClose {
            path: PathBuf::from("/tmp/out.odt"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(
            err.to_string(),
            "Could not close archive file `/tmp/out.odt`: disk full"
        );
        assert_eq!(err.kind(), ErrorKind::ArchiveClose);
    }

    #[test]
    fn test_into_io_keeps_original() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::StorageFull, "full"));
        assert_eq!(err.into_io().kind(), std::io::ErrorKind::StorageFull);

        let err = Error::ZipError("bad".to_string());
        assert_eq!(err.into_io().kind(), std::io::ErrorKind::Other);
    }
}
