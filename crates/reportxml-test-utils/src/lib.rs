//! Testing utilities for the Report XML workspace
//!
//! Shared node builders, documents, and XML fixtures.

#![allow(missing_docs)]

use reportxml_core::{Document, Node, NodeType};

/// A complete report exercising most node types
pub const SAMPLE_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<report xmlns="http://icecast.org/specs/reportxml-0.0.1" version="0.0.1">
    <incident id="i1" definition="not-found">
        <state>
            <text lang="en">File not found</text>
            <timestamp absolute="2018-06-05T14:00:00Z"/>
            <backtrace>
                <position function="main" filename="main.c" line="42" offset="0x1f"/>
                <more/>
            </backtrace>
        </state>
        <resource type="manipulation-target" name="path">
            <value member="path" type="string" value="/tmp/x"/>
        </resource>
        <reason>
            <text>It vanished</text>
        </reason>
        <fix>
            <action type="retry"/>
        </fix>
    </incident>
    <extension application="urn:example">
        <custom key="v">payload</custom>
    </extension>
</report>"#;

pub fn text(content: &str) -> Node {
    let node = Node::new(NodeType::Text).unwrap();
    node.set_content(content).unwrap();
    node
}

pub fn node(node_type: NodeType) -> Node {
    Node::new(node_type).unwrap()
}

/// `state > text` with the given content
pub fn state_with_text(content: &str) -> Node {
    let state = node(NodeType::State);
    state.add_child(&text(content)).unwrap();
    state
}

/// A definition with `defines` set and the given children attached
pub fn definition(defines: &str, children: &[Node]) -> Node {
    let def = node(NodeType::Definition);
    def.set_attribute("defines", defines).unwrap();
    for child in children {
        def.add_child(child).unwrap();
    }
    def
}

/// A definition inheriting from `template`
pub fn templated_definition(defines: &str, template: &str, children: &[Node]) -> Node {
    let def = definition(defines, children);
    def.set_attribute("template", template).unwrap();
    def
}

/// A node of `node_type` carrying a `definition` reference
pub fn reference_to(node_type: NodeType, definition: &str) -> Node {
    Node::with_identity(node_type, None, Some(definition), None).unwrap()
}

/// A report whose root holds the given children
pub fn report_with(children: &[Node]) -> Document {
    let doc = Document::new();
    for child in children {
        doc.root().add_child(child).unwrap();
    }
    doc
}
