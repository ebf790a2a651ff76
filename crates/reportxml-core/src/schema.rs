//! Schema registry
//!
//! Static, read-only table describing every [`NodeType`]: its element name,
//! its [`ContentClass`], the attributes it may carry, and the child types it
//! may contain. Nothing here has state; every lookup is a plain table read.

use crate::error::SchemaViolation;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Reserved attribute used during resolution to record which definition a
/// node was expanded from. Rendered as [`DEFINITION_ATTR`].
pub const PRIVATE_DEFINITION_ATTR: &str = "_definition";

/// Public provenance attribute
pub const DEFINITION_ATTR: &str = "definition";

/// Namespace carried by every report root
pub const REPORTXML_NAMESPACE: &str = "http://icecast.org/specs/reportxml-0.0.1";

/// Schema version carried by every report root
pub const REPORTXML_VERSION: &str = "0.0.1";

/// Closed set of report node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeType {
    /// Document root
    Report,
    /// Named reusable sub-tree
    Definition,
    /// One reported incident
    Incident,
    /// State observed during an incident
    State,
    /// Call stack
    Backtrace,
    /// Frame within a backtrace or value
    Position,
    /// Elided frames marker
    More,
    /// Suggested fix
    Fix,
    /// Step of a fix
    Action,
    /// Reason for an incident
    Reason,
    /// Human readable text
    Text,
    /// Point or span in time
    Timestamp,
    /// Resource involved in an incident
    Resource,
    /// Value of a resource or member
    Value,
    /// Link to external material
    Reference,
    /// Foreign XML payload
    Extension,
}

impl NodeType {
    /// Every node type, in table order
    pub const ALL: [NodeType; 16] = [
        NodeType::Report,
        NodeType::Definition,
        NodeType::Incident,
        NodeType::State,
        NodeType::Backtrace,
        NodeType::Position,
        NodeType::More,
        NodeType::Fix,
        NodeType::Action,
        NodeType::Reason,
        NodeType::Text,
        NodeType::Timestamp,
        NodeType::Resource,
        NodeType::Value,
        NodeType::Reference,
        NodeType::Extension,
    ];

    /// Serialized element name
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        lookup_by_type(self).name
    }

    /// Schema entry for this type
    #[inline]
    #[must_use]
    pub fn schema(self) -> &'static Schema {
        lookup_by_type(self)
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeType {
    type Err = SchemaViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup_by_name(s)
            .map(|schema| schema.node_type)
            .ok_or_else(|| SchemaViolation::UnknownTag(s.to_string()))
    }
}

/// What kind of content a node type holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentClass {
    /// No content at all
    None,
    /// Ordered typed child nodes
    Children,
    /// A single text string
    Text,
    /// Opaque foreign XML fragments
    RawXml,
}

impl Display for ContentClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Children => "children",
            Self::Text => "text",
            Self::RawXml => "raw-xml",
        };
        f.write_str(s)
    }
}

/// Validator hook for attribute values
pub type AttributeChecker = fn(&str) -> bool;

/// Definition of one attribute a node type may carry
#[derive(Clone, Copy)]
pub struct AttributeSpec {
    /// Attribute name
    pub name: &'static str,

    /// DTD-style value type label, informational only
    pub value_type: Option<&'static str>,

    /// Value applied by the node constructor
    pub default: Option<&'static str>,

    /// Whether a complete document must carry this attribute
    pub required: bool,

    /// Closed set of permitted values; empty means unrestricted
    pub values: &'static [&'static str],

    /// Optional validator
    pub checker: Option<AttributeChecker>,
}

impl fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("values", &self.values)
            .field("has_checker", &self.checker.is_some())
            .finish()
    }
}

impl AttributeSpec {
    const fn plain(name: &'static str, value_type: &'static str) -> Self {
        Self {
            name,
            value_type: Some(value_type),
            default: None,
            required: false,
            values: &[],
            checker: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    const fn enumerated(name: &'static str, values: &'static [&'static str]) -> Self {
        Self {
            name,
            value_type: None,
            default: None,
            required: true,
            values,
            checker: None,
        }
    }

    /// Check a candidate value against the closed set and the validator
    ///
    /// # Errors
    /// Returns [`SchemaViolation::ValueNotAllowed`] or
    /// [`SchemaViolation::CheckerRejected`].
    pub fn check(&self, node_type: NodeType, value: &str) -> Result<(), SchemaViolation> {
        if !self.values.is_empty() && !self.values.iter().any(|v| *v == value) {
            return Err(SchemaViolation::ValueNotAllowed {
                node_type,
                name: self.name.to_string(),
                value: value.to_string(),
            });
        }

        if let Some(checker) = self.checker {
            if !checker(value) {
                return Err(SchemaViolation::CheckerRejected {
                    node_type,
                    name: self.name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Schema entry for one node type
#[derive(Debug)]
pub struct Schema {
    /// The node type described
    pub node_type: NodeType,

    /// Serialized element name
    pub name: &'static str,

    /// Content class
    pub content: ContentClass,

    /// Permitted attributes, in default-application order
    pub attributes: &'static [AttributeSpec],

    /// Permitted child types
    pub children: &'static [NodeType],
}

impl Schema {
    /// Find the spec for an attribute name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes.iter().find(|spec| spec.name == name)
    }

    /// Whether `child` may be attached under this type
    #[inline]
    #[must_use]
    pub fn permits_child(&self, child: NodeType) -> bool {
        self.content == ContentClass::Children && self.children.contains(&child)
    }
}

const ATTR_VERSION: AttributeSpec = AttributeSpec {
    name: "version",
    value_type: Some("CDATA"),
    default: Some(REPORTXML_VERSION),
    required: true,
    values: &[REPORTXML_VERSION],
    checker: None,
};
const ATTR_XMLNS: AttributeSpec = AttributeSpec {
    name: "xmlns",
    value_type: Some("URI"),
    default: Some(REPORTXML_NAMESPACE),
    required: true,
    values: &[REPORTXML_NAMESPACE],
    checker: None,
};
const ATTR_ID: AttributeSpec = AttributeSpec::plain("id", "ID");
const ATTR_DEFINITION: AttributeSpec = AttributeSpec::plain(DEFINITION_ATTR, "UUID");
const ATTR_PRIVATE_DEFINITION: AttributeSpec = AttributeSpec::plain(PRIVATE_DEFINITION_ATTR, "UUID");
const ATTR_AKINDOF: AttributeSpec = AttributeSpec::plain("akindof", "UUIDs");
const ATTR_LANG: AttributeSpec = AttributeSpec::plain("lang", "LanguageCode");
const ATTR_DIR: AttributeSpec = AttributeSpec {
    name: "dir",
    value_type: None,
    default: None,
    required: false,
    values: &["ltr", "rtl"],
    checker: None,
};
const ATTR_TEMPLATE: AttributeSpec = AttributeSpec::plain("template", "UUID");
const ATTR_DEFINES: AttributeSpec = AttributeSpec::plain("defines", "UUID").required();
const ATTR_FUNCTION: AttributeSpec = AttributeSpec::plain("function", "CDATA");
const ATTR_FILENAME: AttributeSpec = AttributeSpec::plain("filename", "CDATA");
const ATTR_LINE: AttributeSpec = AttributeSpec::plain("line", "CDATA");
const ATTR_BINARY: AttributeSpec = AttributeSpec::plain("binary", "CDATA");
const ATTR_OFFSET: AttributeSpec = AttributeSpec::plain("offset", "CDATA");
const ATTR_ABSOLUTE: AttributeSpec = AttributeSpec::plain("absolute", "iso8601");
const ATTR_RELATIVE: AttributeSpec = AttributeSpec::plain("relative", "iso8601");
const ATTR_NAME: AttributeSpec = AttributeSpec::plain("name", "CDATA").required();
const ATTR_MEMBER: AttributeSpec = AttributeSpec::plain("member", "CDATA");
const ATTR_VALUE: AttributeSpec = AttributeSpec::plain("value", "CDATA");
const ATTR_STATE: AttributeSpec = AttributeSpec::enumerated(
    "state",
    &["declared", "set", "uninitialized", "missing", "unset", "removed"],
)
.with_default("set");
const ATTR_HREF: AttributeSpec = AttributeSpec::plain("href", "URI");
const ATTR_APPLICATION: AttributeSpec = AttributeSpec::plain("application", "URI").required();
const ATTR_ACTION_TYPE: AttributeSpec = AttributeSpec::enumerated(
    "type",
    &[
        "retry",
        "choice",
        "see-other",
        "authenticate",
        "pay",
        "change-protocol",
        "slow-down",
        "ask-user",
        "ask-admin",
        "bug",
    ],
);
const ATTR_RESOURCE_TYPE: AttributeSpec = AttributeSpec::enumerated(
    "type",
    &[
        "actor",
        "manipulation-target",
        "helper",
        "related",
        "result",
        "parameter",
        "state",
    ],
);
const ATTR_VALUE_TYPE: AttributeSpec = AttributeSpec::enumerated(
    "type",
    &[
        "null",
        "int",
        "float",
        "uuid",
        "string",
        "structure",
        "uri",
        "pointer",
        "version",
        "protocol",
        "username",
        "password",
        "boolean",
    ],
);
const ATTR_REFERENCE_TYPE: AttributeSpec =
    AttributeSpec::enumerated("type", &["documentation", "log", "report", "related"]);

macro_rules! basic_attributes {
    ($($extra:expr),* $(,)?) => {
        &[ATTR_ID, ATTR_DEFINITION, ATTR_AKINDOF, ATTR_PRIVATE_DEFINITION, $($extra),*]
    };
}

use NodeType as T;

static REPORT: Schema = Schema {
    node_type: T::Report,
    name: "report",
    content: ContentClass::Children,
    attributes: &[ATTR_ID, ATTR_VERSION, ATTR_XMLNS],
    children: &[T::Incident, T::Definition, T::Timestamp, T::Reference, T::Extension],
};
static DEFINITION: Schema = Schema {
    node_type: T::Definition,
    name: "definition",
    content: ContentClass::Children,
    attributes: basic_attributes![ATTR_TEMPLATE, ATTR_DEFINES],
    children: &[
        T::Incident,
        T::State,
        T::Timestamp,
        T::Resource,
        T::Reference,
        T::Fix,
        T::Reason,
        T::Text,
        T::Extension,
    ],
};
static INCIDENT: Schema = Schema {
    node_type: T::Incident,
    name: "incident",
    content: ContentClass::Children,
    attributes: basic_attributes![],
    children: &[
        T::State,
        T::Timestamp,
        T::Resource,
        T::Reference,
        T::Fix,
        T::Reason,
        T::Extension,
    ],
};
static STATE: Schema = Schema {
    node_type: T::State,
    name: "state",
    content: ContentClass::Children,
    attributes: basic_attributes![],
    children: &[T::Text, T::Timestamp, T::Backtrace, T::Extension],
};
static BACKTRACE: Schema = Schema {
    node_type: T::Backtrace,
    name: "backtrace",
    content: ContentClass::Children,
    attributes: basic_attributes![],
    children: &[T::Position, T::More, T::Text, T::Reference],
};
static POSITION: Schema = Schema {
    node_type: T::Position,
    name: "position",
    content: ContentClass::Children,
    attributes: basic_attributes![ATTR_FUNCTION, ATTR_FILENAME, ATTR_LINE, ATTR_BINARY, ATTR_OFFSET],
    children: &[T::Text, T::Reference, T::Extension],
};
static MORE: Schema = Schema {
    node_type: T::More,
    name: "more",
    content: ContentClass::Children,
    attributes: basic_attributes![],
    children: &[T::Text],
};
static FIX: Schema = Schema {
    node_type: T::Fix,
    name: "fix",
    content: ContentClass::Children,
    attributes: basic_attributes![],
    children: &[T::Action, T::Extension],
};
static ACTION: Schema = Schema {
    node_type: T::Action,
    name: "action",
    content: ContentClass::Children,
    attributes: basic_attributes![ATTR_ACTION_TYPE],
    children: &[T::Text, T::Timestamp, T::Value, T::Extension],
};
static REASON: Schema = Schema {
    node_type: T::Reason,
    name: "reason",
    content: ContentClass::Children,
    attributes: basic_attributes![],
    children: &[T::Text, T::Resource, T::Reference, T::Extension],
};
static TEXT: Schema = Schema {
    node_type: T::Text,
    name: "text",
    content: ContentClass::Text,
    attributes: basic_attributes![ATTR_LANG, ATTR_DIR],
    children: &[],
};
static TIMESTAMP: Schema = Schema {
    node_type: T::Timestamp,
    name: "timestamp",
    content: ContentClass::None,
    attributes: basic_attributes![ATTR_ABSOLUTE, ATTR_RELATIVE],
    children: &[],
};
static RESOURCE: Schema = Schema {
    node_type: T::Resource,
    name: "resource",
    content: ContentClass::Children,
    attributes: basic_attributes![ATTR_RESOURCE_TYPE, ATTR_NAME],
    children: &[T::Value, T::Reference, T::Extension],
};
static VALUE: Schema = Schema {
    node_type: T::Value,
    name: "value",
    content: ContentClass::Children,
    attributes: basic_attributes![ATTR_MEMBER, ATTR_VALUE, ATTR_STATE, ATTR_VALUE_TYPE],
    children: &[T::Text, T::Reference, T::Value, T::Position, T::Extension],
};
static REFERENCE: Schema = Schema {
    node_type: T::Reference,
    name: "reference",
    content: ContentClass::Children,
    attributes: basic_attributes![ATTR_REFERENCE_TYPE, ATTR_HREF],
    children: &[T::Text, T::Extension],
};
static EXTENSION: Schema = Schema {
    node_type: T::Extension,
    name: "extension",
    content: ContentClass::RawXml,
    attributes: basic_attributes![ATTR_APPLICATION],
    children: &[],
};

/// Schema entry for a node type
#[must_use]
pub fn lookup_by_type(node_type: NodeType) -> &'static Schema {
    match node_type {
        T::Report => &REPORT,
        T::Definition => &DEFINITION,
        T::Incident => &INCIDENT,
        T::State => &STATE,
        T::Backtrace => &BACKTRACE,
        T::Position => &POSITION,
        T::More => &MORE,
        T::Fix => &FIX,
        T::Action => &ACTION,
        T::Reason => &REASON,
        T::Text => &TEXT,
        T::Timestamp => &TIMESTAMP,
        T::Resource => &RESOURCE,
        T::Value => &VALUE,
        T::Reference => &REFERENCE,
        T::Extension => &EXTENSION,
    }
}

/// Schema entry for a serialized element name, if known
#[must_use]
pub fn lookup_by_name(name: &str) -> Option<&'static Schema> {
    NodeType::ALL
        .iter()
        .map(|t| lookup_by_type(*t))
        .find(|schema| schema.name == name)
}

/// Attribute spec for `name` on `schema`, if permitted
#[inline]
#[must_use]
pub fn lookup_attribute(schema: &Schema, name: &str) -> Option<&'static AttributeSpec> {
    schema.attribute(name)
}
