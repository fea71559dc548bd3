//! XML archive reader.

use crate::archive::{FrameKind, ReadSubstrate};
use crate::error::{ArchiveError, Result};
use crate::options::XmlReaderOptions;
use crate::registry::TypeRegistry;
use crate::scalar::{ScalarKind, ScalarValue};

use super::element::{TYPE_ATTRIBUTE, XmlElement};

/// An element being read and the index of its next unread child.
#[derive(Debug, Clone, Copy)]
struct Context<'a> {
    element: &'a XmlElement,
    cursor: usize,
}

/// Reads an archive from an element tree.
///
/// Fields are matched by name, searching forward from the last field read.
/// Elements this reader does not ask for are passed over.
#[derive(Debug)]
pub struct XmlReader<'a> {
    current: Context<'a>,
    stack: Vec<Context<'a>>,
    registry: &'a TypeRegistry,
    options: XmlReaderOptions,
}

impl<'a> XmlReader<'a> {
    /// Create a reader over the children of `root`.
    pub fn new(root: &'a XmlElement, registry: &'a TypeRegistry) -> Self {
        Self::with_options(root, registry, XmlReaderOptions::default())
    }

    /// Create a reader with options.
    pub fn with_options(root: &'a XmlElement, registry: &'a TypeRegistry, options: XmlReaderOptions) -> Self {
        Self {
            current: Context {
                element: root,
                cursor: 0,
            },
            stack: Vec::new(),
            registry,
            options,
        }
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Check that every transaction was closed.
    pub fn finish(self) -> Result<()> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(ArchiveError::UnbalancedTransaction {
                open: self.stack.len(),
            })
        }
    }

    /// Consume the next child named `name`, passing over any others.
    fn find(&mut self, name: &str) -> Result<&'a XmlElement> {
        let element = self.current.element;
        let children = &element.children[self.current.cursor..];
        let index = children
            .iter()
            .position(|child| child.name == name)
            .ok_or_else(|| ArchiveError::missing_element(name))?;
        if index > 0 {
            tracing::trace!(field = name, skipped = index, "Skipped unknown elements");
        }
        self.current.cursor += index + 1;
        Ok(&children[index])
    }
}

impl ReadSubstrate for XmlReader<'_> {
    fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    fn open_frame(&mut self, name: &str, _kind: FrameKind) -> Result<()> {
        if self.stack.len() >= self.options.max_depth {
            return Err(ArchiveError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        let element = self.find(name)?;
        let parent = std::mem::replace(&mut self.current, Context { element, cursor: 0 });
        self.stack.push(parent);
        Ok(())
    }

    fn close_frame(&mut self) -> Result<()> {
        let parent = self.stack.pop().ok_or(ArchiveError::NoOpenTransaction)?;
        let unread = self.current.element.children.len() - self.current.cursor;
        if unread > 0 {
            tracing::trace!(
                element = self.current.element.name.as_str(),
                skipped = unread,
                "Skipped unread elements"
            );
        }
        self.current = parent;
        Ok(())
    }

    fn frame_has_remaining(&self) -> bool {
        self.current.cursor < self.current.element.children.len()
    }

    fn take_presence(&mut self) -> Result<bool> {
        Ok(!self.current.element.is_null())
    }

    fn take_type_hierarchy(&mut self) -> Result<String> {
        self.current
            .element
            .attribute(TYPE_ATTRIBUTE)
            .map(str::to_string)
            .ok_or_else(|| ArchiveError::malformed(TYPE_ATTRIBUTE, ScalarKind::Str, "missing type attribute"))
    }

    fn take_scalar(&mut self, name: &str, kind: ScalarKind) -> Result<Option<ScalarValue>> {
        let element = self.find(name)?;
        if element.is_null() {
            return if kind.is_nullable() {
                Ok(None)
            } else {
                Err(ArchiveError::malformed(name, kind, "null value for a non-nullable field"))
            };
        }
        let text = element.text.as_deref().unwrap_or("");
        ScalarValue::from_text(kind, text)
            .map(Some)
            .map_err(|message| ArchiveError::malformed(name, kind, message))
    }
}
