//! Part generators for [`TextDocument`].
//!
//! One generator per entry of the ODT capability table. `meta.xml` and
//! `styles.xml` are compiled in behind the `meta-part` and `styles-part`
//! features; without them the registry simply leaves those parts out.
//!
//! Output only depends on the document, so saving the same document twice
//! yields the same bytes.

use super::assembler::PackageAssembler;
use super::document::{Block, TextDocument};
use super::media::MediaScope;
use super::options::ExportOptions;
use super::registry::{ODT_PARTS, PartGenerator, PartRegistry, names};
use crate::common::{BoxError, Result, xml::escape_xml};
use crate::odf::constants::{ODF_MANIFEST, ODF_MIMETYPE, ODF_TEXT, OFFICE_VERSION, media_type_for_path};
use std::fmt::Write as _;

type PartResult = std::result::Result<Vec<u8>, BoxError>;

/// `mimetype`: the bare MIME type string, no trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimetypePart;

impl PartGenerator<TextDocument> for MimetypePart {
    fn generate(&self, _document: &TextDocument) -> PartResult {
        Ok(ODF_TEXT.as_bytes().to_vec())
    }
}

/// `content.xml`: body paragraphs, headings and image frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPart;

impl ContentPart {
    fn body(document: &TextDocument) -> String {
        let mut body = String::new();

        for block in document.blocks() {
            body.push_str("      ");
            match block {
                Block::Paragraph(text) => {
                    let _ = write!(
                        body,
                        r#"<text:p text:style-name="Standard">{}</text:p>"#,
                        escape_xml(text)
                    );
                },
                Block::Heading { level, text } => {
                    let _ = write!(
                        body,
                        r#"<text:h text:style-name="Heading_20_{level}" text:outline-level="{level}">{}</text:h>"#,
                        escape_xml(text)
                    );
                },
                Block::Image { name } => {
                    let href = escape_xml(&image_href(name));
                    let name = escape_xml(name);
                    let _ = write!(
                        body,
                        r#"<text:p text:style-name="Standard"><draw:frame draw:name="{name}" text:anchor-type="as-char"><draw:image xlink:href="{href}" xlink:type="simple" xlink:show="embed" xlink:actuate="onLoad"/></draw:frame></text:p>"#
                    );
                },
            }
            body.push('\n');
        }

        body
    }
}

/// `xlink:href` of an embedded image: its archive path, percent-encoded
/// segment by segment.
fn image_href(name: &str) -> String {
    let path: Vec<_> = name.split('/').map(urlencoding::encode).collect();
    format!("Pictures/{}", path.join("/"))
}

impl PartGenerator<TextDocument> for ContentPart {
    fn generate(&self, document: &TextDocument) -> PartResult {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
                          xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0"
                          xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
                          xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0"
                          xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0"
                          xmlns:xlink="http://www.w3.org/1999/xlink"
                          xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0"
                          office:version="{OFFICE_VERSION}">
  <office:scripts/>
  <office:font-face-decls/>
  <office:automatic-styles/>
  <office:body>
    <office:text>
{}    </office:text>
  </office:body>
</office:document-content>
"#,
            Self::body(document)
        );
        Ok(xml.into_bytes())
    }
}

/// `meta.xml`: generator string and the populated Dublin Core fields.
#[cfg(feature = "meta-part")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaPart;

#[cfg(feature = "meta-part")]
impl PartGenerator<TextDocument> for MetaPart {
    fn generate(&self, document: &TextDocument) -> PartResult {
        let metadata = document.metadata();

        let mut meta = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
                       xmlns:xlink="http://www.w3.org/1999/xlink"
                       xmlns:dc="http://purl.org/dc/elements/1.1/"
                       xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0"
                       office:version="{OFFICE_VERSION}">
  <office:meta>
    <meta:generator>Longan/{}</meta:generator>
"#,
            env!("CARGO_PKG_VERSION")
        );

        let fields = [
            ("dc:title", &metadata.title),
            ("dc:description", &metadata.description),
            ("dc:subject", &metadata.subject),
            ("meta:initial-creator", &metadata.author),
            ("dc:creator", &metadata.author),
        ];
        for (tag, value) in fields {
            if let Some(value) = value {
                let _ = writeln!(meta, "    <{tag}>{}</{tag}>", escape_xml(value));
            }
        }

        if let Some(keywords) = &metadata.keywords {
            for keyword in keywords.split(',').map(str::trim).filter(|k| !k.is_empty()) {
                let _ = writeln!(meta, "    <meta:keyword>{}</meta:keyword>", escape_xml(keyword));
            }
        }

        if let Some(created) = metadata.created {
            let _ = writeln!(
                meta,
                "    <meta:creation-date>{}</meta:creation-date>",
                created.format("%Y-%m-%dT%H:%M:%SZ")
            );
        }
        if let Some(modified) = metadata.modified.or(metadata.created) {
            let _ = writeln!(meta, "    <dc:date>{}</dc:date>", modified.format("%Y-%m-%dT%H:%M:%SZ"));
        }

        meta.push_str("  </office:meta>\n");
        meta.push_str("</office:document-meta>\n");
        Ok(meta.into_bytes())
    }
}

/// `styles.xml`: default paragraph style and the six heading styles.
#[cfg(feature = "styles-part")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesPart;

#[cfg(feature = "styles-part")]
impl PartGenerator<TextDocument> for StylesPart {
    fn generate(&self, _document: &TextDocument) -> PartResult {
        const HEADING_SIZES: [&str; 6] = ["130%", "115%", "101%", "95%", "85%", "85%"];

        let mut headings = String::new();
        for (index, size) in HEADING_SIZES.iter().enumerate() {
            let level = index + 1;
            let _ = write!(
                headings,
                r#"    <style:style style:name="Heading_20_{level}" style:display-name="Heading {level}" style:family="paragraph" style:parent-style-name="Heading" style:next-style-name="Standard" style:default-outline-level="{level}">
      <style:text-properties fo:font-size="{size}" fo:font-weight="bold"/>
    </style:style>
"#
            );
        }

        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
                         xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0"
                         xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
                         xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0"
                         office:version="{OFFICE_VERSION}">
  <office:font-face-decls/>
  <office:styles>
    <style:default-style style:family="paragraph">
      <style:paragraph-properties fo:margin-top="0cm" fo:margin-bottom="0.247cm"/>
      <style:text-properties fo:font-size="12pt"/>
    </style:default-style>
    <style:style style:name="Standard" style:family="paragraph" style:class="text"/>
    <style:style style:name="Heading" style:family="paragraph" style:parent-style-name="Standard" style:next-style-name="Standard" style:class="text">
      <style:paragraph-properties fo:margin-top="0.423cm" fo:margin-bottom="0.212cm" fo:keep-with-next="always"/>
      <style:text-properties fo:font-size="14pt"/>
    </style:style>
{headings}  </office:styles>
  <office:automatic-styles/>
  <office:master-styles/>
</office:document-styles>
"#
        );
        Ok(xml.into_bytes())
    }
}

/// `META-INF/manifest.xml`: root entry, written parts and embedded media.
///
/// The part list is fixed when the registry is built, so parts disabled
/// there never show up in the manifest.
#[derive(Debug, Clone)]
pub struct ManifestPart {
    parts: Vec<String>,
    scopes: Vec<MediaScope>,
}

impl ManifestPart {
    /// Create a manifest generator over the planned part paths and the
    /// media scopes the assembler enumerates.
    pub fn new(parts: Vec<String>, scopes: Vec<MediaScope>) -> Self {
        let parts = parts
            .into_iter()
            .filter(|path| path != ODF_MIMETYPE && path != ODF_MANIFEST)
            .collect();
        Self { parts, scopes }
    }
}

impl PartGenerator<TextDocument> for ManifestPart {
    fn generate(&self, document: &TextDocument) -> PartResult {
        let mut manifest = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="{OFFICE_VERSION}">
  <manifest:file-entry manifest:full-path="/" manifest:version="{OFFICE_VERSION}" manifest:media-type="{ODF_TEXT}"/>
"#
        );

        let media = self
            .scopes
            .iter()
            .flat_map(|&scope| document.images(scope))
            .map(|image| image.archive_path());
        for path in self.parts.iter().cloned().chain(media) {
            let _ = writeln!(
                manifest,
                r#"  <manifest:file-entry manifest:full-path="{}" manifest:media-type="{}"/>"#,
                escape_xml(&path),
                media_type_for_path(&path)
            );
        }

        manifest.push_str("</manifest:manifest>\n");
        Ok(manifest.into_bytes())
    }
}

/// Build the ODT registry for [`TextDocument`] with the generators compiled
/// into this build, honoring `options.disabled_parts`.
pub fn text_registry(options: &ExportOptions) -> Result<PartRegistry<TextDocument>> {
    let builder = PartRegistry::builder(&ODT_PARTS)
        .generator(names::MIMETYPE, MimetypePart)
        .generator(names::CONTENT, ContentPart);
    #[cfg(feature = "meta-part")]
    let builder = builder.generator(names::META, MetaPart);
    #[cfg(feature = "styles-part")]
    let builder = builder.generator(names::STYLES, StylesPart);

    let builder = options
        .disabled_parts
        .iter()
        .fold(builder, |builder, name| builder.disable(name));

    let manifest = ManifestPart::new(builder.planned_paths(), options.media_scopes.clone());
    builder.generator(names::MANIFEST, manifest).build()
}

impl PackageAssembler<TextDocument> {
    /// Assembler for [`TextDocument`] with default options.
    pub fn text() -> Result<Self> {
        Self::text_with_options(ExportOptions::default())
    }

    /// Assembler for [`TextDocument`] with the given options.
    pub fn text_with_options(options: ExportOptions) -> Result<Self> {
        let registry = text_registry(&options)?;
        Ok(PackageAssembler::with_options(
            registry,
            super::document::TextDocumentMedia,
            options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ErrorKind, Metadata};
    use crate::odf::core::{Manifest, PackageReader};
    use chrono::{TimeZone, Utc};
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use std::io::Cursor;

    fn assert_well_formed(xml: &[u8]) {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(_) => {},
                Err(e) => panic!("malformed XML: {e}\n{}", String::from_utf8_lossy(xml)),
            }
            buf.clear();
        }
    }

    fn sample() -> TextDocument {
        let mut document = TextDocument::new();
        document.add_heading("Results & Findings", 1).unwrap();
        document.add_paragraph("x < y > z");
        document.add_image("chart.png", vec![0x89, b'P', b'N', b'G']).unwrap();
        document
            .attach_image(MediaScope::Header, "logo.svg", b"<svg/>".to_vec())
            .unwrap();
        document
    }

    #[test]
    fn test_content_part() {
        let xml = ContentPart.generate(&sample()).unwrap();
        assert_well_formed(&xml);

        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(
            r#"<text:h text:style-name="Heading_20_1" text:outline-level="1">Results &amp; Findings</text:h>"#
        ));
        assert!(xml.contains("x &lt; y &gt; z"));
        assert!(xml.contains(r#"xlink:href="Pictures/chart.png""#));
    }

    #[test]
    fn test_image_href_is_percent_encoded() {
        let mut document = TextDocument::new();
        document.add_image("chart 1.svg", b"<svg/>".to_vec()).unwrap();
        document.add_image("100%.png", vec![0x89]).unwrap();

        let xml = ContentPart.generate(&document).unwrap();
        assert_well_formed(&xml);
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"draw:name="chart 1.svg""#));
        assert!(xml.contains(r#"xlink:href="Pictures/chart%201.svg""#));
        assert!(xml.contains(r#"xlink:href="Pictures/100%25.png""#));

        assert_eq!(image_href("charts/q3 & q4.png"), "Pictures/charts/q3%20%26%20q4.png");
    }

    #[test]
    fn test_mimetype_part() {
        assert_eq!(MimetypePart.generate(&TextDocument::new()).unwrap(), ODF_TEXT.as_bytes());
    }

    #[cfg(feature = "meta-part")]
    #[test]
    fn test_meta_part_is_deterministic() {
        let mut document = TextDocument::new();
        document.set_metadata(Metadata {
            title: Some("Q3 <draft>".to_string()),
            author: Some("Ada".to_string()),
            keywords: Some("finance, quarterly,".to_string()),
            created: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).single(),
            ..Default::default()
        });

        let first = MetaPart.generate(&document).unwrap();
        assert_eq!(first, MetaPart.generate(&document).unwrap());
        assert_well_formed(&first);

        let xml = String::from_utf8(first).unwrap();
        assert!(xml.contains("<dc:title>Q3 &lt;draft&gt;</dc:title>"));
        assert!(xml.contains("<meta:initial-creator>Ada</meta:initial-creator>"));
        assert!(xml.contains("<meta:keyword>finance</meta:keyword>"));
        assert!(xml.contains("<meta:keyword>quarterly</meta:keyword>"));
        assert!(xml.contains("<meta:creation-date>2024-05-01T08:30:00Z</meta:creation-date>"));
        assert!(xml.contains("<dc:date>2024-05-01T08:30:00Z</dc:date>"));
        assert!(!xml.contains("dc:subject"));
    }

    #[cfg(feature = "styles-part")]
    #[test]
    fn test_styles_part() {
        let xml = StylesPart.generate(&TextDocument::new()).unwrap();
        assert_well_formed(&xml);
        let xml = String::from_utf8(xml).unwrap();
        for level in 1..=6 {
            assert!(xml.contains(&format!(r#"style:name="Heading_20_{level}""#)));
        }
    }

    #[test]
    fn test_manifest_part_lists_parts_and_scoped_media() {
        let part = ManifestPart::new(
            vec![
                "mimetype".to_string(),
                "content.xml".to_string(),
                "styles.xml".to_string(),
                "META-INF/manifest.xml".to_string(),
            ],
            vec![MediaScope::Section],
        );
        let xml = String::from_utf8(part.generate(&sample()).unwrap()).unwrap();
        let manifest = Manifest::parse(&xml).unwrap();

        assert_eq!(manifest.mimetype.as_deref(), Some(ODF_TEXT));
        assert_eq!(
            manifest.paths().collect::<Vec<_>>(),
            ["/", "content.xml", "styles.xml", "Pictures/chart.png"]
        );
        assert_eq!(manifest.get_media_type("Pictures/chart.png"), Some("image/png"));
        // header media is not enumerated by these scopes
        assert!(!manifest.has_path("Pictures/logo.svg"));
    }

    #[test]
    fn test_text_registry_honors_disabled_parts() {
        let options = ExportOptions::default().with_disabled_part(names::CONTENT);
        let registry = text_registry(&options).unwrap();
        assert!(!registry.get(names::CONTENT).unwrap().is_enabled());

        let err = text_registry(&ExportOptions::default().with_disabled_part("thumbnail")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownPart);
    }

    #[test]
    fn test_text_package_verifies() {
        let assembler = PackageAssembler::text_with_options(
            ExportOptions::default().with_media_scopes([MediaScope::Section, MediaScope::Header]),
        )
        .unwrap();
        let bytes = assembler.to_bytes(&sample()).unwrap();

        assert_eq!(assembler.options().media_scopes, [MediaScope::Section, MediaScope::Header]);

        let reader = PackageReader::from_reader(Cursor::new(bytes)).unwrap();
        reader.verify().unwrap();
        assert_eq!(reader.entries()[0].name, "mimetype");
        assert!(reader.has_file("Pictures/chart.png"));
        assert!(reader.has_file("Pictures/logo.svg"));
        assert!(reader.manifest().unwrap().has_path("Pictures/logo.svg"));
    }

    #[test]
    fn test_disabled_part_absent_from_manifest() {
        let assembler = PackageAssembler::text_with_options(
            ExportOptions::default().with_disabled_part(names::CONTENT),
        )
        .unwrap();
        let bytes = assembler.to_bytes(&sample()).unwrap();

        let reader = PackageReader::from_reader(Cursor::new(bytes)).unwrap();
        reader.verify().unwrap();
        assert!(!reader.has_file("content.xml"));
        assert!(!reader.manifest().unwrap().has_path("content.xml"));
    }

    #[cfg(feature = "styles-part")]
    #[test]
    fn test_disabled_styles_not_written() {
        let options = ExportOptions::default().with_disabled_part(names::STYLES);
        let assembler = PackageAssembler::text_with_options(options).unwrap();
        assert_eq!(assembler.options().disabled_parts, [names::STYLES]);

        let bytes = assembler.to_bytes(&sample()).unwrap();
        let reader = PackageReader::from_reader(Cursor::new(bytes)).unwrap();
        reader.verify().unwrap();
        assert!(!reader.has_file("styles.xml"));
        assert!(!reader.manifest().unwrap().has_path("styles.xml"));
    }
}
