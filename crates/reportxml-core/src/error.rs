//! Error types for report nodes and documents
//!
//! - [`SchemaViolation`]: a mutation the schema does not allow
//! - [`ParseError`]: foreign XML that cannot become a report tree

use crate::schema::{ContentClass, NodeType};
use crate::xml::XmlError;

/// A node mutation rejected by the schema
///
/// Every operation returning this error leaves the node unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    /// Element name not in the schema
    #[error("unknown element: <{0}>")]
    UnknownTag(String),

    /// Attribute not permitted on this type
    #[error("attribute '{name}' is not permitted on <{node_type}>")]
    UnknownAttribute { node_type: NodeType, name: String },

    /// Value outside the attribute's closed set
    #[error("value '{value}' is not allowed for <{node_type} {name}>")]
    ValueNotAllowed {
        node_type: NodeType,
        name: String,
        value: String,
    },

    /// Attribute validator rejected the value
    #[error("value '{value}' rejected by checker for <{node_type} {name}>")]
    CheckerRejected {
        node_type: NodeType,
        name: String,
        value: String,
    },

    /// Operation needs a different content class
    #[error("<{node_type}> holds {actual} content, operation needs {required}")]
    ContentMismatch {
        node_type: NodeType,
        required: ContentClass,
        actual: ContentClass,
    },

    /// Child type not permitted under parent type
    #[error("<{child}> is not permitted under <{parent}>")]
    ChildNotPermitted { parent: NodeType, child: NodeType },

    /// Attaching the child would make the tree cyclic
    #[error("attaching <{child}> under <{parent}> would create a cycle")]
    CyclicAttachment { parent: NodeType, child: NodeType },
}

/// Errors while turning XML into report nodes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Substrate could not read the input
    #[error("xml error: {0}")]
    Xml(#[from] XmlError),

    /// Element name not in the schema
    #[error("unknown element: <{0}>")]
    UnknownElement(String),

    /// Element or attribute rejected by the schema
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaViolation),

    /// Document root is not a report
    #[error("document root must be <report>, found <{0}>")]
    NotAReport(NodeType),
}

/// Result type alias for node mutations
pub type NodeResult<T> = Result<T, SchemaViolation>;
