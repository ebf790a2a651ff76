//! Report XML Core
//!
//! Schema-validated incident report trees.
//!
//! # Overview
//!
//! - **Schema**: static table of node types, permitted attributes, and
//!   permitted children
//! - **Node**: shared, typed tree node that rejects any mutation the schema
//!   does not allow
//! - **Document**: a tree rooted at `<report>` with traversal lookups
//! - **XML**: minimal owned XML tree for reading and writing documents
//!
//! # Example
//!
//! ```rust
//! use reportxml_core::{Document, Node, NodeType};
//!
//! let doc = Document::new();
//! let incident = Node::with_identity(NodeType::Incident, Some("i1"), None, None).unwrap();
//! doc.root().add_child(&incident).unwrap();
//!
//! let xml = doc.to_xml_string().unwrap();
//! let back = Document::from_xml_str(&xml).unwrap();
//! assert_eq!(back, doc);
//! ```

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod node;
pub mod schema;
pub mod xml;

// Re-exports
pub use document::Document;
pub use error::{NodeResult, ParseError, SchemaViolation};
pub use node::Node;
pub use schema::{
    lookup_attribute, lookup_by_name, lookup_by_type, AttributeChecker, AttributeSpec,
    ContentClass, NodeType, Schema, DEFINITION_ATTR, PRIVATE_DEFINITION_ATTR,
    REPORTXML_NAMESPACE, REPORTXML_VERSION,
};
pub use xml::{XmlElement, XmlError, XmlNode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and reading reports
    pub use crate::{
        Document, Node, NodeResult, NodeType, ParseError, SchemaViolation, XmlElement, XmlNode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
