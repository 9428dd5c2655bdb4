//! Reference text document model.
//!
//! [`TextDocument`] is a deliberately small model: metadata, a flat list of
//! paragraphs, headings and image anchors, and the images themselves. It is
//! what the bundled part generators understand; custom models plug their
//! own generators into a [`PartRegistry`](super::PartRegistry) instead.

use super::media::{MediaCollector, MediaEntry, MediaScope};
use crate::common::{Error, Metadata, Result};
use crate::odf::core::validate_entry_path;
use bytes::Bytes;

/// One block of body content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Plain paragraph
    Paragraph(String),
    /// Heading with outline level 1-6
    Heading { level: u8, text: String },
    /// Paragraph anchoring a body image by file name
    Image { name: String },
}

/// An image attached to one scope of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    name: String,
    data: Bytes,
    scope: MediaScope,
}

impl Image {
    /// File name under `Pictures/`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw image bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Scope the image belongs to
    pub fn scope(&self) -> MediaScope {
        self.scope
    }

    /// Path of the image inside the package
    pub fn archive_path(&self) -> String {
        format!("Pictures/{}", self.name)
    }
}

/// A text document ready for export.
///
/// # Examples
///
/// ```
/// use longan::odf::odt::{Block, TextDocument};
///
/// # fn main() -> longan::Result<()> {
/// let mut document = TextDocument::new();
/// document.add_heading("Chapter 1", 1)?;
/// document.add_paragraph("Hello, World!");
/// document.add_image("logo.png", vec![0x89, b'P', b'N', b'G'])?;
///
/// assert_eq!(document.blocks().len(), 3);
/// assert!(matches!(&document.blocks()[2], Block::Image { name } if name == "logo.png"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDocument {
    metadata: Metadata,
    blocks: Vec<Block>,
    images: Vec<Image>,
}

impl TextDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Document metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Set document metadata
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    /// Body blocks in document order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Images attached to `scope`, in insertion order.
    pub fn images(&self, scope: MediaScope) -> impl Iterator<Item = &Image> {
        self.images.iter().filter(move |image| image.scope == scope)
    }

    /// Add a paragraph with text
    pub fn add_paragraph(&mut self, text: &str) -> &mut Self {
        self.blocks.push(Block::Paragraph(text.to_string()));
        self
    }

    /// Add a heading
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if `level` is outside 1-6.
    pub fn add_heading(&mut self, text: &str, level: u8) -> Result<&mut Self> {
        if !(1..=6).contains(&level) {
            return Err(Error::InvalidFormat(format!(
                "Heading level must be between 1 and 6, got {level}"
            )));
        }
        self.blocks.push(Block::Heading {
            level,
            text: text.to_string(),
        });
        Ok(self)
    }

    /// Add an image to the body and anchor it at the current position.
    pub fn add_image(&mut self, name: &str, data: impl Into<Bytes>) -> Result<&mut Self> {
        self.attach_image(MediaScope::Section, name, data)?;
        self.blocks.push(Block::Image {
            name: name.to_string(),
        });
        Ok(self)
    }

    /// Attach an image to a scope without anchoring it in the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryPath`] if `name` does not make a valid
    /// entry path, or [`Error::DuplicateEntry`] if the name is already taken
    /// by another image of any scope.
    pub fn attach_image(
        &mut self,
        scope: MediaScope,
        name: &str,
        data: impl Into<Bytes>,
    ) -> Result<&mut Self> {
        let image = Image {
            name: name.to_string(),
            data: data.into(),
            scope,
        };
        validate_entry_path(&image.archive_path())?;
        if self.images.iter().any(|existing| existing.name == image.name) {
            return Err(Error::DuplicateEntry(image.archive_path()));
        }
        self.images.push(image);
        Ok(self)
    }
}

/// Media collector over the images of a [`TextDocument`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDocumentMedia;

impl MediaCollector<TextDocument> for TextDocumentMedia {
    fn collect_media<'a>(
        &'a self,
        document: &'a TextDocument,
        scope: MediaScope,
    ) -> Box<dyn Iterator<Item = MediaEntry> + 'a> {
        Box::new(
            document
                .images(scope)
                .map(|image| MediaEntry::image(&image.name, image.data.clone())),
        )
    }
}
