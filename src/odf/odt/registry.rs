//! Part generator registry.
//!
//! The set of parts a package can contain is a static capability table of
//! [`PartSlot`]s. A [`PartRegistryBuilder`] pairs each slot with the
//! generator compiled into this build and produces an ordered, immutable
//! [`PartRegistry`]:
//!
//! - an optional slot without a generator is left out of the registry;
//! - a mandatory slot without a generator fails with
//!   [`Error::MissingMandatoryPart`];
//! - a slot whose archive path is empty stays registered but is never
//!   written, so parts can be disabled without editing the table.

use crate::common::{BoxError, Error, Result};
use crate::odf::constants::{ODF_CONTENT, ODF_MANIFEST, ODF_META, ODF_MIMETYPE, ODF_STYLES};
use crate::odf::core::validate_entry_path;
use std::collections::HashSet;
use std::fmt;

/// Produces the bytes of one named part from a document model.
pub trait PartGenerator<D: ?Sized>: Send + Sync {
    /// Generate the full content of the part.
    fn generate(&self, document: &D) -> std::result::Result<Vec<u8>, BoxError>;
}

impl<D: ?Sized, F> PartGenerator<D> for F
where
    F: Fn(&D) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn generate(&self, document: &D) -> std::result::Result<Vec<u8>, BoxError> {
        self(document)
    }
}

/// One row of a capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartSlot {
    /// Unique part name
    pub name: &'static str,
    /// Path inside the archive; empty disables the part
    pub archive_path: &'static str,
    /// Whether the package is still conforming without this part
    pub optional: bool,
}

/// Part names of the OpenDocument Text capability table.
pub mod names {
    pub const MIMETYPE: &str = "mimetype";
    pub const CONTENT: &str = "content";
    pub const META: &str = "meta";
    pub const STYLES: &str = "styles";
    pub const MANIFEST: &str = "manifest";
}

/// Capability table of an OpenDocument Text package, in write order.
pub const ODT_PARTS: [PartSlot; 5] = [
    PartSlot {
        name: names::MIMETYPE,
        archive_path: ODF_MIMETYPE,
        optional: false,
    },
    PartSlot {
        name: names::CONTENT,
        archive_path: ODF_CONTENT,
        optional: false,
    },
    PartSlot {
        name: names::META,
        archive_path: ODF_META,
        optional: true,
    },
    PartSlot {
        name: names::STYLES,
        archive_path: ODF_STYLES,
        optional: true,
    },
    PartSlot {
        name: names::MANIFEST,
        archive_path: ODF_MANIFEST,
        optional: false,
    },
];

/// A registered part: where it goes and how its bytes are produced.
pub struct PartDescriptor<D: ?Sized> {
    name: String,
    archive_path: String,
    optional: bool,
    generator: Box<dyn PartGenerator<D>>,
}

impl<D: ?Sized> PartDescriptor<D> {
    /// Part name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path inside the archive (empty when disabled)
    pub fn archive_path(&self) -> &str {
        &self.archive_path
    }

    /// Whether the part is optional
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the part is written to the archive
    pub fn is_enabled(&self) -> bool {
        !self.archive_path.is_empty()
    }

    /// Run the generator, tagging failures with the part name.
    pub fn generate(&self, document: &D) -> Result<Vec<u8>> {
        self.generator
            .generate(document)
            .map_err(|source| Error::PartGeneration {
                part: self.name.clone(),
                source,
            })
    }
}

impl<D: ?Sized> fmt::Debug for PartDescriptor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartDescriptor")
            .field("name", &self.name)
            .field("archive_path", &self.archive_path)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable set of part descriptors.
pub struct PartRegistry<D: ?Sized> {
    parts: Vec<PartDescriptor<D>>,
}

impl<D: ?Sized> PartRegistry<D> {
    /// Start a registry from a capability table.
    pub fn builder(table: &[PartSlot]) -> PartRegistryBuilder<D> {
        PartRegistryBuilder::new(table)
    }

    /// All registered parts in write order, including disabled ones.
    pub fn iter(&self) -> impl Iterator<Item = &PartDescriptor<D>> {
        self.parts.iter()
    }

    /// Registered parts that are written to the archive.
    pub fn enabled(&self) -> impl Iterator<Item = &PartDescriptor<D>> {
        self.parts.iter().filter(|part| part.is_enabled())
    }

    /// Look up a part by name.
    pub fn get(&self, name: &str) -> Option<&PartDescriptor<D>> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// Number of registered parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if no part is registered.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<D: ?Sized> fmt::Debug for PartRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.parts.iter()).finish()
    }
}

#[derive(Debug, Clone)]
struct SlotState {
    name: String,
    archive_path: String,
    optional: bool,
}

/// Builder pairing a capability table with generators.
///
/// # Examples
///
/// ```
/// use longan::odf::odt::{PartRegistry, ODT_PARTS, names};
/// use longan::BoxError;
///
/// fn stub(_doc: &str) -> Result<Vec<u8>, BoxError> {
///     Ok(b"<X/>".to_vec())
/// }
///
/// let registry = PartRegistry::<str>::builder(&ODT_PARTS)
///     .generator(names::MIMETYPE, |_: &str| -> Result<Vec<u8>, BoxError> {
///         Ok(b"application/vnd.oasis.opendocument.text".to_vec())
///     })
///     .generator(names::CONTENT, stub)
///     .generator(names::MANIFEST, stub)
///     .build()
///     .unwrap();
///
/// // meta and styles are optional and had no generator
/// assert_eq!(registry.len(), 3);
/// ```
pub struct PartRegistryBuilder<D: ?Sized> {
    slots: Vec<SlotState>,
    generators: Vec<(String, Box<dyn PartGenerator<D>>)>,
    path_overrides: Vec<(String, String)>,
}

impl<D: ?Sized> PartRegistryBuilder<D> {
    fn new(table: &[PartSlot]) -> Self {
        Self {
            slots: table
                .iter()
                .map(|slot| SlotState {
                    name: slot.name.to_string(),
                    archive_path: slot.archive_path.to_string(),
                    optional: slot.optional,
                })
                .collect(),
            generators: Vec::new(),
            path_overrides: Vec::new(),
        }
    }

    /// Attach the generator for the part called `name`.
    pub fn generator(mut self, name: &str, generator: impl PartGenerator<D> + 'static) -> Self {
        self.generators.push((name.to_string(), Box::new(generator)));
        self
    }

    /// Override the archive path of the part called `name`.
    pub fn archive_path(mut self, name: &str, archive_path: &str) -> Self {
        self.path_overrides
            .push((name.to_string(), archive_path.to_string()));
        self
    }

    /// Keep the part registered but never write it.
    pub fn disable(self, name: &str) -> Self {
        self.archive_path(name, "")
    }

    /// Archive paths that the built registry will write, in order.
    ///
    /// Unknown names in overrides are ignored here; [`build`](Self::build)
    /// reports them.
    pub fn planned_paths(&self) -> Vec<String> {
        self.resolved_slots()
            .into_iter()
            .filter(|slot| !slot.archive_path.is_empty())
            .filter(|slot| !slot.optional || self.has_generator(&slot.name))
            .map(|slot| slot.archive_path)
            .collect()
    }

    /// Validate the table and produce the registry.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicatePart`] if a name or a non-empty archive path repeats
    /// - [`Error::UnknownPart`] if a generator or override names no slot
    /// - [`Error::InvalidEntryPath`] if an archive path is malformed
    /// - [`Error::MissingMandatoryPart`] if a mandatory slot has no generator
    pub fn build(self) -> Result<PartRegistry<D>> {
        for (name, _) in &self.path_overrides {
            if !self.slots.iter().any(|slot| &slot.name == name) {
                return Err(Error::UnknownPart(name.clone()));
            }
        }
        let slots = self.resolved_slots();

        let mut seen_names = HashSet::new();
        let mut seen_paths = HashSet::new();
        for slot in &slots {
            if !seen_names.insert(slot.name.as_str()) {
                return Err(Error::DuplicatePart(slot.name.clone()));
            }
            if slot.archive_path.is_empty() {
                continue;
            }
            validate_entry_path(&slot.archive_path)?;
            if !seen_paths.insert(slot.archive_path.as_str()) {
                return Err(Error::DuplicatePart(slot.archive_path.clone()));
            }
        }

        let mut seen_generators = HashSet::new();
        for (name, _) in &self.generators {
            if !seen_names.contains(name.as_str()) {
                return Err(Error::UnknownPart(name.clone()));
            }
            if !seen_generators.insert(name.as_str()) {
                return Err(Error::DuplicatePart(name.clone()));
            }
        }

        let mut generators = self.generators;
        let mut parts = Vec::with_capacity(slots.len());
        for slot in slots {
            let position = generators.iter().position(|(name, _)| *name == slot.name);
            match position {
                Some(index) => {
                    let (_, generator) = generators.swap_remove(index);
                    parts.push(PartDescriptor {
                        name: slot.name,
                        archive_path: slot.archive_path,
                        optional: slot.optional,
                        generator,
                    });
                },
                None if slot.optional => {
                    tracing::debug!(part = %slot.name, "optional part has no generator, omitted");
                },
                None => return Err(Error::MissingMandatoryPart(slot.name)),
            }
        }

        Ok(PartRegistry { parts })
    }

    fn has_generator(&self, name: &str) -> bool {
        self.generators.iter().any(|(generator, _)| generator == name)
    }

    fn resolved_slots(&self) -> Vec<SlotState> {
        let mut slots = self.slots.clone();
        for (name, path) in &self.path_overrides {
            if let Some(slot) = slots.iter_mut().find(|slot| &slot.name == name) {
                slot.archive_path = path.clone();
            }
        }
        slots
    }
}
