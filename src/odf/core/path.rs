//! Archive entry path rules.
//!
//! Entry names inside an ODF package are relative, forward-slash separated
//! and case-sensitive. They never start with `/`, never contain `\`, and
//! never contain empty, `.` or `..` segments.

use crate::common::{Error, Result};

/// Validate an archive entry path for a file entry.
///
/// # Examples
///
/// ```
/// use longan::odf::core::validate_entry_path;
///
/// assert!(validate_entry_path("Pictures/logo.png").is_ok());
/// assert!(validate_entry_path("/content.xml").is_err());
/// assert!(validate_entry_path("Pictures/../content.xml").is_err());
/// ```
pub fn validate_entry_path(path: &str) -> Result<()> {
    let reason = if path.is_empty() {
        Some("path is empty")
    } else if path.starts_with('/') {
        Some("path must be relative")
    } else if path.contains('\\') {
        Some("path must use forward slashes")
    } else if path.ends_with('/') {
        Some("path names a directory")
    } else if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        Some("path contains an empty, `.` or `..` segment")
    } else if path.chars().any(char::is_control) {
        Some("path contains control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidEntryPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
