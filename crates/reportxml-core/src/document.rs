//! Report documents
//!
//! A [`Document`] owns a root node of type `report`.

use crate::error::ParseError;
use crate::node::Node;
use crate::schema::NodeType;
use crate::xml::{XmlElement, XmlError};

/// A report tree rooted at a `report` node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Create an empty report with schema defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::with_defaults(NodeType::Report),
        }
    }

    /// Build a document from an XML root element
    ///
    /// # Errors
    /// Returns [`ParseError::NotAReport`] if the root is not `<report>`, or
    /// any error from [`Node::parse`].
    pub fn parse(element: &XmlElement) -> Result<Self, ParseError> {
        let root = Node::parse(element)?;
        if root.node_type() != NodeType::Report {
            return Err(ParseError::NotAReport(root.node_type()));
        }
        Ok(Self { root })
    }

    /// Parse a document from XML text
    ///
    /// # Errors
    /// Returns [`ParseError::Xml`] for malformed input, otherwise as
    /// [`Document::parse`].
    pub fn from_xml_str(input: &str) -> Result<Self, ParseError> {
        Self::parse(&XmlElement::parse_str(input)?)
    }

    /// Render to an XML root element
    #[inline]
    #[must_use]
    pub fn render(&self) -> XmlElement {
        self.root.render()
    }

    /// Render to XML text with a declaration
    ///
    /// # Errors
    /// Returns [`XmlError::Write`] if the writer fails.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        self.render().write_document()
    }

    /// Shared handle to the root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// First node (pre-order) whose attribute `key` equals `value`
    #[must_use]
    pub fn find_by_attribute(
        &self,
        key: &str,
        value: &str,
        include_definitions: bool,
    ) -> Option<Node> {
        self.root.find_by_attribute(key, value, include_definitions)
    }

    /// First node (pre-order) of the given type
    #[must_use]
    pub fn find_by_type(&self, node_type: NodeType, include_definitions: bool) -> Option<Node> {
        self.root.find_by_type(node_type, include_definitions)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
