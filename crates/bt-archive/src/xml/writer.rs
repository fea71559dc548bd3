//! XML archive writer.

use crate::archive::WriteSubstrate;
use crate::error::{ArchiveError, Result};
use crate::options::XmlWriterOptions;
use crate::scalar::{Scalar, ScalarKind};

use super::element::{NULL_ATTRIBUTE, TYPE_ATTRIBUTE, XmlElement, is_xml_char};

/// Builds an element tree; every transaction becomes a child element.
#[derive(Debug)]
pub struct XmlWriter {
    /// Root first, innermost open element last.
    open: Vec<XmlElement>,
    options: XmlWriterOptions,
}

impl XmlWriter {
    /// Create a writer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(XmlWriterOptions::default())
    }

    /// Create a writer with options.
    #[must_use]
    pub fn with_options(options: XmlWriterOptions) -> Self {
        Self {
            open: vec![XmlElement::new(options.root_name.as_str())],
            options,
        }
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.open.len() - 1
    }

    /// Return the root element, failing if a transaction is still open.
    pub fn finish(mut self) -> Result<XmlElement> {
        if self.open.len() > 1 {
            return Err(ArchiveError::UnbalancedTransaction {
                open: self.depth(),
            });
        }
        let root = self.open.pop().ok_or(ArchiveError::NoOpenTransaction)?;
        validate_name(&root.name)?;
        Ok(root)
    }

    fn current(&mut self) -> Result<&mut XmlElement> {
        self.open.last_mut().ok_or(ArchiveError::NoOpenTransaction)
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that `name` can be used as an element name.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ArchiveError::InvalidFieldName {
            name: name.to_string(),
        })
    }
}

impl WriteSubstrate for XmlWriter {
    fn open_frame(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        if self.depth() >= self.options.max_depth {
            return Err(ArchiveError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.open.push(XmlElement::new(name));
        Ok(())
    }

    fn close_frame(&mut self) -> Result<()> {
        if self.open.len() <= 1 {
            return Err(ArchiveError::NoOpenTransaction);
        }
        let element = self.open.pop().ok_or(ArchiveError::NoOpenTransaction)?;
        self.current()?.push_child(element);
        Ok(())
    }

    fn put_presence(&mut self, present: bool) -> Result<()> {
        if !present {
            self.current()?.set_attribute(NULL_ATTRIBUTE, "true");
        }
        Ok(())
    }

    fn put_type_hierarchy(&mut self, hierarchy: &str) -> Result<()> {
        self.current()?.set_attribute(TYPE_ATTRIBUTE, hierarchy);
        Ok(())
    }

    fn put_scalar(&mut self, name: &str, value: Scalar<'_>) -> Result<()> {
        validate_name(name)?;
        if let Scalar::Str(text) = value
            && let Some(c) = text.chars().find(|c| !is_xml_char(*c))
        {
            return Err(ArchiveError::malformed(
                name,
                ScalarKind::Str,
                format!("character {c:?} cannot be stored in XML"),
            ));
        }
        let element = XmlElement::new(name).with_text(value.to_text());
        self.current()?.push_child(element);
        Ok(())
    }

    fn put_null(&mut self, name: &str, kind: ScalarKind) -> Result<()> {
        validate_name(name)?;
        if !kind.is_nullable() {
            return Err(ArchiveError::unexpected_null(name));
        }
        let element = XmlElement::new(name).with_attribute(NULL_ATTRIBUTE, "true");
        self.current()?.push_child(element);
        Ok(())
    }
}
