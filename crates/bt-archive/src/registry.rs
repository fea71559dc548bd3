//! Type registry: stable tags mapped to prototype values.

use std::collections::HashMap;
use std::fmt;

use crate::archivable::{Archivable, split_hierarchy, validate_tag};
use crate::error::{ArchiveError, Result};

/// Maps type tags to prototypes that produce fresh instances.
///
/// Populate it once before any archive is read, then share it by reference.
/// Registration needs `&mut self`, so it cannot race a read.
#[derive(Default)]
pub struct TypeRegistry {
    prototypes: HashMap<String, Box<dyn Archivable>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its most specific tag.
    pub fn register<T: Archivable + Default>(&mut self) -> Result<()> {
        self.register_prototype(Box::new(T::default()))
    }

    /// Register a prototype under its most specific tag.
    pub fn register_prototype(&mut self, prototype: Box<dyn Archivable>) -> Result<()> {
        let tag = prototype.type_tag();
        self.register_as(tag, prototype)
    }

    /// Register a prototype under an explicit tag.
    ///
    /// Used to make an ancestor tag resolvable on its own.
    pub fn register_as(&mut self, tag: &str, prototype: Box<dyn Archivable>) -> Result<()> {
        validate_tag(tag)?;
        if self.prototypes.contains_key(tag) {
            return Err(ArchiveError::DuplicateType {
                tag: tag.to_string(),
            });
        }
        self.prototypes.insert(tag.to_string(), prototype);
        Ok(())
    }

    /// Whether `tag` is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.prototypes.contains_key(tag)
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Whether no tag is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Registered tags in sorted order.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.prototypes.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// First tag of `hierarchy` that is registered.
    #[must_use]
    pub fn resolve<'a>(&self, hierarchy: &'a str) -> Option<&'a str> {
        split_hierarchy(hierarchy).find(|tag| self.prototypes.contains_key(*tag))
    }

    /// Create a fresh instance for the first registered tag of `hierarchy`.
    pub fn instantiate(&self, hierarchy: &str) -> Result<Box<dyn Archivable>> {
        for (index, tag) in split_hierarchy(hierarchy).enumerate() {
            if let Some(prototype) = self.prototypes.get(tag) {
                if index > 0 {
                    tracing::debug!(
                        requested = hierarchy,
                        resolved = tag,
                        "Resolved object through ancestor tag"
                    );
                }
                return Ok(prototype.prototype());
            }
        }
        Err(ArchiveError::unresolved_type(hierarchy))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
