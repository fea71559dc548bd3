//! Owned XML element tree.

use std::borrow::Cow;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{ArchiveError, Result};

/// Nesting guard for parsed documents.
const MAX_PARSE_DEPTH: usize = 1024;

/// Attribute marking an absent value.
pub(crate) const NULL_ATTRIBUTE: &str = "null";

/// Attribute carrying an object's type hierarchy.
pub(crate) const TYPE_ATTRIBUTE: &str = "type";

/// An element with attributes and either text or child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Value of the attribute `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Whether the element is marked `null="true"`.
    pub fn is_null(&self) -> bool {
        self.attribute(NULL_ATTRIBUTE) == Some("true")
    }

    /// Render as a document with an XML declaration.
    ///
    /// `indent` is the number of spaces per level; `None` renders compactly.
    pub fn to_xml_string(&self, indent: Option<usize>) -> Result<String> {
        let bytes = match indent {
            Some(width) => render(Writer::new_with_indent(Vec::new(), b' ', width), self)?,
            None => render(Writer::new(Vec::new()), self)?,
        };
        String::from_utf8(bytes).map_err(ArchiveError::xml)
    }

    /// Parse a document and return its root element.
    pub fn parse(text: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(text).map_err(ArchiveError::xml)?;
        convert(document.root_element(), 0)
    }
}

fn render(mut xml: Writer<Vec<u8>>, root: &XmlElement) -> Result<Vec<u8>> {
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(ArchiveError::xml)?;
    write_element(&mut xml, root)?;
    Ok(xml.into_inner())
}

fn write_element(xml: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text.as_deref().filter(|text| !text.is_empty());
    if text.is_none() && element.children.is_empty() {
        return xml.write_event(Event::Empty(start)).map_err(ArchiveError::xml);
    }

    xml.write_event(Event::Start(start)).map_err(ArchiveError::xml)?;
    if let Some(text) = text {
        xml.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))
            .map_err(ArchiveError::xml)?;
    }
    for child in &element.children {
        write_element(xml, child)?;
    }
    xml.write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(ArchiveError::xml)
}

/// Whether `c` may appear in XML 1.0 character data.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
}

/// Escape markup characters, and carriage returns so parsers keep them.
fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}

fn convert(node: roxmltree::Node<'_, '_>, depth: usize) -> Result<XmlElement> {
    if depth > MAX_PARSE_DEPTH {
        return Err(ArchiveError::xml(format!(
            "element nesting exceeds {MAX_PARSE_DEPTH} levels"
        )));
    }

    let mut element = XmlElement::new(node.tag_name().name());
    for attribute in node.attributes() {
        element
            .attributes
            .push((attribute.name().to_string(), attribute.value().to_string()));
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            element.children.push(convert(child, depth + 1)?);
        } else if child.is_text()
            && let Some(fragment) = child.text()
        {
            text.push_str(fragment);
        }
    }
    // Whitespace between child elements is layout, not content.
    if element.children.is_empty() && !text.is_empty() {
        element.text = Some(text);
    }
    Ok(element)
}
