//! Generic XML tree substrate
//!
//! Provides [`XmlElement`] and [`XmlNode`], a minimal owned XML tree backed by
//! `quick-xml` for reading and writing. The tree knows nothing about the
//! report schema: it only carries tags, attributes in document order, and
//! ordered children. `Clone` is the structural deep copy.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

/// A child of an [`XmlElement`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),

    /// Character data (already unescaped)
    Text(String),

    /// CDATA section
    CData(String),

    /// Comment
    Comment(String),
}

impl XmlNode {
    /// Shortcut for a text node
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for text or CDATA nodes made only of XML whitespace
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) | Self::CData(text) => {
                text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
            }
            _ => false,
        }
    }

    /// Element view, if this is an element
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        Self::Element(element)
    }
}

/// An owned XML element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Tag name as written in the document
    pub name: String,

    /// Attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Ordered children
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element with no attributes or children
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`XmlElement::set_attribute`]
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder form of [`XmlElement::push`]
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.push(child);
        self
    }

    /// Get attribute value by name
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Append a child
    #[inline]
    pub fn push(&mut self, child: impl Into<XmlNode>) {
        self.children.push(child.into());
    }

    /// Iterate over element children only
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Parse a document and return its root element
    ///
    /// The XML declaration, doctype, processing instructions, and comments
    /// outside the root are discarded.
    ///
    /// # Errors
    /// Returns [`XmlError`] on malformed input, a missing root, or content
    /// after the root element.
    pub fn parse_str(input: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|e| XmlError::syntax(position, e))?;

            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(XmlError::TrailingContent { position });
                    }
                    stack.push(element_from_start(&start, position)?);
                }
                Event::Empty(start) => {
                    if root.is_some() {
                        return Err(XmlError::TrailingContent { position });
                    }
                    let element = element_from_start(&start, position)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(element),
                        None => root = Some(element),
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or(XmlError::UnbalancedEnd { position })?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(element),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| XmlError::syntax(position, e))?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(XmlNode::Text(value.into_owned())),
                        None if value.trim().is_empty() => {}
                        None => return Err(XmlError::TrailingContent { position }),
                    }
                }
                Event::CData(data) => {
                    let value = utf8(data.into_inner(), position)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(XmlNode::CData(value)),
                        None => return Err(XmlError::TrailingContent { position }),
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push(XmlNode::Comment(utf8(comment.into_inner(), position)?));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::UnexpectedEof);
        }

        root.ok_or(XmlError::MissingRoot)
    }

    /// Serialize this element (without XML declaration)
    ///
    /// # Errors
    /// Returns [`XmlError::Write`] if the writer fails.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        into_string(writer.into_inner())
    }

    /// Serialize this element as the root of a document, with XML declaration
    ///
    /// # Errors
    /// Returns [`XmlError::Write`] if the writer fails.
    pub fn write_document(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(XmlError::write)?;
        write_element(&mut writer, self)?;
        into_string(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<XmlElement, XmlError> {
    let name = utf8(Cow::Borrowed(start.name().as_ref()), position)?;
    let mut element = XmlElement::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::syntax(position, e))?;
        let key = utf8(Cow::Borrowed(attr.key.as_ref()), position)?;
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::syntax(position, e))?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(XmlError::write);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(XmlError::write)?;

    for child in &element.children {
        match child {
            XmlNode::Element(inner) => write_element(writer, inner)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(XmlError::write)?,
            XmlNode::CData(data) => writer
                .write_event(Event::CData(BytesCData::new(data.as_str())))
                .map_err(XmlError::write)?,
            XmlNode::Comment(comment) => writer
                .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
                .map_err(XmlError::write)?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(XmlError::write)
}

fn utf8(bytes: Cow<'_, [u8]>, position: u64) -> Result<String, XmlError> {
    String::from_utf8(bytes.into_owned()).map_err(|_| XmlError::InvalidUtf8 { position })
}

fn into_string(bytes: Vec<u8>) -> Result<String, XmlError> {
    String::from_utf8(bytes).map_err(|_| XmlError::InvalidUtf8 { position: 0 })
}

/// Errors from the XML substrate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// Reader rejected the input
    #[error("malformed xml at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// Closing tag without matching open tag
    #[error("unbalanced end tag at byte {position}")]
    UnbalancedEnd { position: u64 },

    /// Input ended inside an element
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// No root element found
    #[error("document has no root element")]
    MissingRoot,

    /// Content outside the single root element
    #[error("content after root element at byte {position}")]
    TrailingContent { position: u64 },

    /// Names, values, or output were not valid UTF-8
    #[error("invalid utf-8 at byte {position}")]
    InvalidUtf8 { position: u64 },

    /// Writer failure
    #[error("xml write failed: {0}")]
    Write(String),
}

impl XmlError {
    fn syntax(position: u64, err: impl std::fmt::Display) -> Self {
        Self::Syntax {
            position,
            message: err.to_string(),
        }
    }

    fn write(err: impl std::fmt::Display) -> Self {
        Self::Write(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_elements() {
        let root = XmlElement::parse_str(r#"<a x="1"><b/><c y="2">hi</c></a>"#).unwrap();

        assert_eq!(root.name, "a");
        assert_eq!(root.attribute("x"), Some("1"));
        assert_eq!(root.children.len(), 2);

        let c = root.child_elements().nth(1).unwrap();
        assert_eq!(c.attribute("y"), Some("2"));
        assert_eq!(c.children, vec![XmlNode::text("hi")]);
    }

    #[test]
    fn parse_skips_declaration_and_outer_comments() {
        let input = "<?xml version=\"1.0\"?>\n<!-- head -->\n<root/>\n";
        let root = XmlElement::parse_str(input).unwrap();
        assert_eq!(root.name, "root");
        assert!(root.children.is_empty());
    }

    #[test]
    fn parse_keeps_inner_comments_and_whitespace() {
        let root = XmlElement::parse_str("<r>\n  <!-- c -->\n</r>").unwrap();
        assert_eq!(root.children.len(), 3);
        assert!(root.children[0].is_blank());
        assert_eq!(root.children[1], XmlNode::Comment(" c ".to_string()));
    }

    #[test]
    fn parse_unescapes_entities() {
        let root = XmlElement::parse_str(r#"<r v="a&amp;b">&lt;x&gt;</r>"#).unwrap();
        assert_eq!(root.attribute("v"), Some("a&b"));
        assert_eq!(root.children, vec![XmlNode::text("<x>")]);
    }

    #[test]
    fn parse_rejects_mismatched_tags() {
        assert!(XmlElement::parse_str("<a><b></a>").is_err());
    }

    #[test]
    fn parse_rejects_unclosed_root() {
        assert_eq!(XmlElement::parse_str("<a>"), Err(XmlError::UnexpectedEof));
    }

    #[test]
    fn parse_rejects_second_root() {
        assert!(matches!(
            XmlElement::parse_str("<a/><b/>"),
            Err(XmlError::TrailingContent { .. })
        ));
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(XmlElement::parse_str(""), Err(XmlError::MissingRoot));
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut el = XmlElement::new("e")
            .with_attribute("a", "1")
            .with_attribute("b", "2");
        el.set_attribute("a", "3");

        assert_eq!(
            el.attributes,
            vec![("a".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]
        );
        assert_eq!(el.remove_attribute("a"), Some("3".to_string()));
        assert_eq!(el.attribute("a"), None);
    }

    #[test]
    fn write_then_parse_preserves_tree() {
        let el = XmlElement::new("r")
            .with_attribute("q", "\"quoted\" & <angled>")
            .with_child(XmlElement::new("c").with_child(XmlNode::text("1 < 2")))
            .with_child(XmlNode::CData("raw <data>".to_string()));

        let xml = el.to_xml_string().unwrap();
        assert_eq!(XmlElement::parse_str(&xml).unwrap(), el);
    }

    #[test]
    fn write_document_has_declaration() {
        let xml = XmlElement::new("r").write_document().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.ends_with("<r/>"));
    }
}
