//! ODF constants: MIME types, package part paths and media types.
//!
//! # References
//!
//! - OASIS OpenDocument v1.2, Part 3: Packages

use phf::{Map, phf_map};

/// ODF specification version written into the manifest and parts
pub const OFFICE_VERSION: &str = "1.2";

// ============================================================================
// MIME TYPES
// ============================================================================

/// MIME type for OpenDocument Text (.odt)
pub const ODF_TEXT: &str = "application/vnd.oasis.opendocument.text";

/// MIME type to file extension mapping for the text family (compile-time perfect hash map)
pub static ODF_MIMETYPES: Map<&'static str, &'static str> = phf_map! {
    "application/vnd.oasis.opendocument.text" => "odt",
    "application/vnd.oasis.opendocument.text-template" => "ott",
    "application/vnd.oasis.opendocument.text-master" => "odm",
    "application/vnd.oasis.opendocument.text-web" => "oth",
};

// ============================================================================
// STANDARD ODF PARTS PATHS
// ============================================================================

/// Path of the magic marker entry
pub const ODF_MIMETYPE: &str = "mimetype";

/// Path to content.xml (main document content)
pub const ODF_CONTENT: &str = "content.xml";

/// Path to meta.xml (document metadata)
pub const ODF_META: &str = "meta.xml";

/// Path to styles.xml (document styles)
pub const ODF_STYLES: &str = "styles.xml";

/// Path to manifest.xml (package manifest)
pub const ODF_MANIFEST: &str = "META-INF/manifest.xml";

/// Media type recorded for XML parts in the manifest
pub const XML_MEDIA_TYPE: &str = "text/xml";

// ============================================================================
// MEDIA TYPES
// ============================================================================

/// Lower-case file extension to media type (compile-time perfect hash map)
pub static MEDIA_TYPES: Map<&'static str, &'static str> = phf_map! {
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "bmp" => "image/bmp",
    "tif" => "image/tiff",
    "tiff" => "image/tiff",
    "svg" => "image/svg+xml",
    "webp" => "image/webp",
    "emf" => "image/x-emf",
    "wmf" => "image/x-wmf",
    "xml" => "text/xml",
};

/// Media type used when the extension is unknown
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Guess the manifest media type of an archive path from its extension.
///
/// # Examples
///
/// ```
/// use longan::odf::constants::media_type_for_path;
///
/// assert_eq!(media_type_for_path("Pictures/logo.PNG"), "image/png");
/// assert_eq!(media_type_for_path("Pictures/blob"), "application/octet-stream");
/// ```
pub fn media_type_for_path(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((_, ext)) => MEDIA_TYPES
            .get(ext.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(DEFAULT_MEDIA_TYPE),
        None => DEFAULT_MEDIA_TYPE,
    }
}

/// Check if a given MIME type belongs to the OpenDocument text family
#[inline]
pub fn is_text_mime_type(mime_type: &str) -> bool {
    ODF_MIMETYPES.contains_key(mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_for_path() {
        assert_eq!(media_type_for_path("Pictures/a.jpeg"), "image/jpeg");
        assert_eq!(media_type_for_path("Pictures/a.JPG"), "image/jpeg");
        assert_eq!(media_type_for_path("Pictures/v1.2/photo"), DEFAULT_MEDIA_TYPE);
        assert_eq!(media_type_for_path("content.xml"), XML_MEDIA_TYPE);
    }

    #[test]
    fn test_is_text_mime_type() {
        assert!(is_text_mime_type(ODF_TEXT));
        assert!(is_text_mime_type("application/vnd.oasis.opendocument.text-master"));
        assert!(!is_text_mime_type("application/vnd.oasis.opendocument.spreadsheet"));
        assert!(!is_text_mime_type("text/plain"));
    }

    #[test]
    fn test_standard_paths() {
        assert_eq!(ODF_MIMETYPE, "mimetype");
        assert_eq!(ODF_CONTENT, "content.xml");
        assert_eq!(ODF_META, "meta.xml");
        assert_eq!(ODF_STYLES, "styles.xml");
        assert_eq!(ODF_MANIFEST, "META-INF/manifest.xml");
    }
}
