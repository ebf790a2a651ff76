//! Schema-validated report nodes
//!
//! A [`Node`] is a shared handle: cloning it clones the handle, not the tree.
//! The same node may sit under several parents at once, which is how
//! resolved definitions get spliced into more than one result tree. Use
//! [`Node::deep_copy`] for an independent structural copy.
//!
//! Every mutation goes through the schema registry and is all-or-nothing.

use crate::error::{NodeResult, ParseError, SchemaViolation};
use crate::schema::{
    lookup_by_name, lookup_by_type, ContentClass, NodeType, Schema, DEFINITION_ATTR,
    PRIVATE_DEFINITION_ATTR,
};
use crate::xml::{XmlElement, XmlNode};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a typed report node
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    node_type: NodeType,
    state: RwLock<NodeState>,
}

#[derive(Clone)]
struct NodeState {
    attributes: IndexMap<String, String>,
    body: Body,
}

/// Content storage; the variant is fixed by the type's [`ContentClass`]
#[derive(Clone)]
enum Body {
    Empty,
    Children(Vec<Node>),
    Text(Option<String>),
    Foreign(Vec<XmlNode>),
}

impl Body {
    fn for_class(content: ContentClass) -> Self {
        match content {
            ContentClass::None => Self::Empty,
            ContentClass::Children => Self::Children(Vec::new()),
            ContentClass::Text => Self::Text(None),
            ContentClass::RawXml => Self::Foreign(Vec::new()),
        }
    }

    fn deep_copy(&self) -> Self {
        match self {
            Self::Children(children) => {
                Self::Children(children.iter().map(Node::deep_copy).collect())
            }
            other => other.clone(),
        }
    }
}

impl Node {
    /// Create a node with every schema default applied
    ///
    /// # Errors
    /// Returns [`SchemaViolation`] if a default is rejected by its own spec.
    pub fn new(node_type: NodeType) -> NodeResult<Self> {
        let node = Self::blank(node_type);

        for spec in node.schema().attributes {
            if let Some(default) = spec.default {
                node.set_attribute(spec.name, default)?;
            }
        }

        Ok(node)
    }

    fn blank(node_type: NodeType) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                node_type,
                state: RwLock::new(NodeState {
                    attributes: IndexMap::new(),
                    body: Body::for_class(lookup_by_type(node_type).content),
                }),
            }),
        }
    }

    /// Node with defaults inserted unchecked; the static tables only carry
    /// defaults their own specs accept.
    pub(crate) fn with_defaults(node_type: NodeType) -> Self {
        let node = Self::blank(node_type);
        {
            let mut state = node.inner.state.write();
            for spec in node.schema().attributes {
                if let Some(default) = spec.default {
                    state.attributes.insert(spec.name.to_string(), default.to_string());
                }
            }
        }
        node
    }

    /// Create a node and set `id`, `definition`, and `akindof` when given
    ///
    /// # Errors
    /// Returns the first [`SchemaViolation`]; the partial node is dropped.
    pub fn with_identity(
        node_type: NodeType,
        id: Option<&str>,
        definition: Option<&str>,
        akindof: Option<&str>,
    ) -> NodeResult<Self> {
        let node = Self::new(node_type)?;

        for (name, value) in [("id", id), (DEFINITION_ATTR, definition), ("akindof", akindof)] {
            if let Some(value) = value {
                node.set_attribute(name, value)?;
            }
        }

        Ok(node)
    }

    /// Node type (fixed at construction)
    #[inline]
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.inner.node_type
    }

    /// Schema entry for this node's type
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &'static Schema {
        lookup_by_type(self.inner.node_type)
    }

    /// True if both handles point to the same node
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Set an attribute after validating it against the schema
    ///
    /// # Errors
    /// Returns [`SchemaViolation`] if the name is not permitted or the
    /// value is rejected; the attribute map is left untouched.
    pub fn set_attribute(&self, name: &str, value: &str) -> NodeResult<()> {
        let node_type = self.node_type();
        let spec = self
            .schema()
            .attribute(name)
            .ok_or_else(|| SchemaViolation::UnknownAttribute {
                node_type,
                name: name.to_string(),
            })?;
        spec.check(node_type, value)?;

        self.inner
            .state
            .write()
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Get attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.state.read().attributes.get(name).cloned()
    }

    /// Whether the attribute is set
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner.state.read().attributes.contains_key(name)
    }

    /// Snapshot of all attributes in insertion order
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.inner
            .state
            .read()
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Names of required attributes that are not set
    #[must_use]
    pub fn missing_required_attributes(&self) -> Vec<&'static str> {
        let state = self.inner.state.read();
        self.schema()
            .attributes
            .iter()
            .filter(|spec| spec.required && !state.attributes.contains_key(spec.name))
            .map(|spec| spec.name)
            .collect()
    }

    fn content_mismatch(&self, required: ContentClass) -> SchemaViolation {
        SchemaViolation::ContentMismatch {
            node_type: self.node_type(),
            required,
            actual: self.schema().content,
        }
    }

    /// Append a child node (shared, not copied)
    ///
    /// # Errors
    /// Returns [`SchemaViolation`] if this type does not hold children, the
    /// child's type is not permitted here, or the child contains this node.
    pub fn add_child(&self, child: &Node) -> NodeResult<()> {
        let schema = self.schema();
        if schema.content != ContentClass::Children {
            return Err(self.content_mismatch(ContentClass::Children));
        }
        if !schema.permits_child(child.node_type()) {
            return Err(SchemaViolation::ChildNotPermitted {
                parent: self.node_type(),
                child: child.node_type(),
            });
        }
        if child.contains(self) {
            return Err(SchemaViolation::CyclicAttachment {
                parent: self.node_type(),
                child: child.node_type(),
            });
        }

        if let Body::Children(children) = &mut self.inner.state.write().body {
            children.push(child.clone());
        }
        Ok(())
    }

    /// Whether `other` is this node or one of its descendants
    fn contains(&self, other: &Node) -> bool {
        self.ptr_eq(other) || self.children().iter().any(|child| child.contains(other))
    }

    /// Number of typed children
    #[must_use]
    pub fn child_count(&self) -> usize {
        match &self.inner.state.read().body {
            Body::Children(children) => children.len(),
            _ => 0,
        }
    }

    /// Shared handle to the child at `idx`
    #[must_use]
    pub fn child(&self, idx: usize) -> Option<Node> {
        match &self.inner.state.read().body {
            Body::Children(children) => children.get(idx).cloned(),
            _ => None,
        }
    }

    /// Snapshot of child handles
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        match &self.inner.state.read().body {
            Body::Children(children) => children.clone(),
            _ => Vec::new(),
        }
    }

    /// Replace the text content
    ///
    /// # Errors
    /// Returns [`SchemaViolation::ContentMismatch`] unless this type holds text.
    pub fn set_content(&self, text: &str) -> NodeResult<()> {
        match &mut self.inner.state.write().body {
            Body::Text(content) => {
                *content = Some(text.to_string());
                Ok(())
            }
            _ => Err(self.content_mismatch(ContentClass::Text)),
        }
    }

    /// Remove the text content
    ///
    /// # Errors
    /// Returns [`SchemaViolation::ContentMismatch`] unless this type holds text.
    pub fn clear_content(&self) -> NodeResult<()> {
        match &mut self.inner.state.write().body {
            Body::Text(content) => {
                *content = None;
                Ok(())
            }
            _ => Err(self.content_mismatch(ContentClass::Text)),
        }
    }

    /// Text content, if any
    #[must_use]
    pub fn content(&self) -> Option<String> {
        match &self.inner.state.read().body {
            Body::Text(content) => content.clone(),
            _ => None,
        }
    }

    /// Store a copy of a foreign XML fragment
    ///
    /// # Errors
    /// Returns [`SchemaViolation::ContentMismatch`] unless this type holds raw XML.
    pub fn add_foreign_child(&self, fragment: &XmlNode) -> NodeResult<()> {
        match &mut self.inner.state.write().body {
            Body::Foreign(fragments) => {
                fragments.push(fragment.clone());
                Ok(())
            }
            _ => Err(self.content_mismatch(ContentClass::RawXml)),
        }
    }

    /// Number of stored foreign fragments
    #[must_use]
    pub fn foreign_child_count(&self) -> usize {
        match &self.inner.state.read().body {
            Body::Foreign(fragments) => fragments.len(),
            _ => 0,
        }
    }

    /// Copy of the foreign fragment at `idx`
    #[must_use]
    pub fn foreign_child(&self, idx: usize) -> Option<XmlNode> {
        match &self.inner.state.read().body {
            Body::Foreign(fragments) => fragments.get(idx).cloned(),
            _ => None,
        }
    }

    /// Independent structural copy of this subtree
    ///
    /// Attributes, including the private provenance marker, are copied
    /// verbatim. Shared children become distinct copies.
    #[must_use]
    pub fn deep_copy(&self) -> Node {
        let state = self.inner.state.read();
        Node {
            inner: Arc::new(NodeInner {
                node_type: self.inner.node_type,
                state: RwLock::new(NodeState {
                    attributes: state.attributes.clone(),
                    body: state.body.deep_copy(),
                }),
            }),
        }
    }

    /// Copy of this node without its typed children
    ///
    /// Attributes, text content, and foreign fragments are kept.
    #[must_use]
    pub fn shallow_copy(&self) -> Node {
        let state = self.inner.state.read();
        let body = match &state.body {
            Body::Children(_) => Body::Children(Vec::new()),
            other => other.clone(),
        };
        Node {
            inner: Arc::new(NodeInner {
                node_type: self.inner.node_type,
                state: RwLock::new(NodeState {
                    attributes: state.attributes.clone(),
                    body,
                }),
            }),
        }
    }

    /// Build a node tree from an XML element
    ///
    /// Blank text and comments are skipped. Children of an `extension` are
    /// kept verbatim as foreign fragments.
    ///
    /// # Errors
    /// Returns [`ParseError`] on an unknown element, a rejected attribute, or
    /// a child the schema does not permit. Nothing partial is returned.
    pub fn parse(element: &XmlElement) -> Result<Node, ParseError> {
        let schema = lookup_by_name(&element.name)
            .ok_or_else(|| ParseError::UnknownElement(element.name.clone()))?;
        let node = Node::new(schema.node_type)?;

        for (key, value) in &element.attributes {
            node.set_attribute(key, value)?;
        }

        for child in &element.children {
            if schema.content == ContentClass::RawXml {
                node.add_foreign_child(child)?;
                continue;
            }

            match child {
                XmlNode::Comment(_) => {}
                blank if blank.is_blank() => {}
                XmlNode::Text(text) | XmlNode::CData(text) => node.set_content(text)?,
                XmlNode::Element(inner) => node.add_child(&Node::parse(inner)?)?,
            }
        }

        Ok(node)
    }

    /// Render this node tree back to XML
    ///
    /// The private provenance marker is emitted as the public `definition`
    /// attribute, replacing any explicit value.
    #[must_use]
    pub fn render(&self) -> XmlElement {
        let state = self.inner.state.read();
        let mut element = XmlElement::new(self.schema().name);

        for (key, value) in &state.attributes {
            if key != PRIVATE_DEFINITION_ATTR {
                element.attributes.push((key.clone(), value.clone()));
            }
        }
        if let Some(marker) = state.attributes.get(PRIVATE_DEFINITION_ATTR) {
            element.set_attribute(DEFINITION_ATTR, marker.clone());
        }

        match &state.body {
            Body::Empty => {}
            Body::Children(children) => {
                for child in children {
                    element.push(child.render());
                }
            }
            Body::Text(content) => {
                if let Some(text) = content {
                    element.push(XmlNode::Text(text.clone()));
                }
            }
            Body::Foreign(fragments) => element.children.extend(fragments.iter().cloned()),
        }

        element
    }

    /// Depth-first pre-order search for a node whose attribute `key` equals `value`
    ///
    /// With `include_definitions` false, a `definition` node can still match
    /// itself but its interior is not searched.
    #[must_use]
    pub fn find_by_attribute(
        &self,
        key: &str,
        value: &str,
        include_definitions: bool,
    ) -> Option<Node> {
        if self.attribute(key).as_deref() == Some(value) {
            return Some(self.clone());
        }
        if self.node_type() == NodeType::Definition && !include_definitions {
            return None;
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_attribute(key, value, include_definitions))
    }

    /// Depth-first pre-order search for the first node of `node_type`
    ///
    /// Same `include_definitions` rule as [`Node::find_by_attribute`].
    #[must_use]
    pub fn find_by_type(&self, node_type: NodeType, include_definitions: bool) -> Option<Node> {
        if self.node_type() == node_type {
            return Some(self.clone());
        }
        if self.node_type() == NodeType::Definition && !include_definitions {
            return None;
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_type(node_type, include_definitions))
    }
}

impl PartialEq for Node {
    /// Structural equality: type, attribute map, and content
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.node_type() != other.node_type() {
            return false;
        }

        let a = self.inner.state.read();
        let b = other.inner.state.read();
        if a.attributes != b.attributes {
            return false;
        }

        match (&a.body, &b.body) {
            (Body::Empty, Body::Empty) => true,
            (Body::Children(x), Body::Children(y)) => x == y,
            (Body::Text(x), Body::Text(y)) => x == y,
            (Body::Foreign(x), Body::Foreign(y)) => x == y,
            _ => false,
        }
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        let mut out = f.debug_struct("Node");
        out.field("type", &self.inner.node_type)
            .field("attributes", &state.attributes);
        match &state.body {
            Body::Empty => {}
            Body::Children(children) => {
                out.field("children", children);
            }
            Body::Text(content) => {
                out.field("content", content);
            }
            Body::Foreign(fragments) => {
                out.field("foreign", fragments);
            }
        }
        out.finish()
    }
}
