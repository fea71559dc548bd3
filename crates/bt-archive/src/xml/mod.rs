//! XML substrate.
//!
//! Every field is a child element named after the field. Transactions and
//! objects nest as elements, `null="true"` marks absent values and objects
//! carry their hierarchy in a `type` attribute:
//!
//! ```xml
//! <document>
//!   <root type="Equity,Instrument">
//!     <symbol>MSFT</symbol>
//!     <lot_size null="true"/>
//!   </root>
//! </document>
//! ```

mod element;
mod reader;
mod writer;

pub use element::XmlElement;
pub use reader::XmlReader;
pub use writer::XmlWriter;

use crate::archivable::Archivable;
use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::{ArchiveError, Result};
use crate::object::ROOT_FIELD;
use crate::options::{XmlReaderOptions, XmlWriterOptions};
use crate::registry::TypeRegistry;

/// Encode a possibly-null object as an element tree.
pub fn to_document(value: Option<&dyn Archivable>) -> Result<XmlElement> {
    to_document_with_options(value, XmlWriterOptions::default())
}

/// Encode a possibly-null object as an element tree with options.
pub fn to_document_with_options(
    value: Option<&dyn Archivable>,
    options: XmlWriterOptions,
) -> Result<XmlElement> {
    let mut writer = XmlWriter::with_options(options);
    writer.write_object(ROOT_FIELD, value)?;
    writer.finish()
}

/// Encode a possibly-null object as XML text.
pub fn to_string(value: Option<&dyn Archivable>) -> Result<String> {
    to_string_with_options(value, XmlWriterOptions::default())
}

/// Encode a possibly-null object as XML text with options.
pub fn to_string_with_options(
    value: Option<&dyn Archivable>,
    options: XmlWriterOptions,
) -> Result<String> {
    let indent = options.indent;
    let document = to_document_with_options(value, options)?;
    let text = document.to_xml_string(indent)?;
    tracing::debug!(bytes = text.len(), "Encoded XML archive");
    Ok(text)
}

/// Decode an object from an element tree.
pub fn from_document(document: &XmlElement, registry: &TypeRegistry) -> Result<Option<Box<dyn Archivable>>> {
    from_document_with_options(document, registry, XmlReaderOptions::default())
}

/// Decode an object from an element tree with options.
pub fn from_document_with_options(
    document: &XmlElement,
    registry: &TypeRegistry,
    options: XmlReaderOptions,
) -> Result<Option<Box<dyn Archivable>>> {
    if document.name != options.root_name {
        return Err(ArchiveError::missing_element(options.root_name));
    }
    let mut reader = XmlReader::with_options(document, registry, options);
    let value = reader.read_object(ROOT_FIELD)?;
    reader.finish()?;
    Ok(value)
}

/// Decode an object from XML text.
pub fn from_str(text: &str, registry: &TypeRegistry) -> Result<Option<Box<dyn Archivable>>> {
    from_str_with_options(text, registry, XmlReaderOptions::default())
}

/// Decode an object from XML text with options.
pub fn from_str_with_options(
    text: &str,
    registry: &TypeRegistry,
    options: XmlReaderOptions,
) -> Result<Option<Box<dyn Archivable>>> {
    let document = XmlElement::parse(text)?;
    let value = from_document_with_options(&document, registry, options)?;
    tracing::debug!(bytes = text.len(), "Decoded XML archive");
    Ok(value)
}
