use pretty_assertions::assert_eq;
use proptest::prelude::*;
use reportxml_core::{Document, NodeType, PRIVATE_DEFINITION_ATTR};
use reportxml_db::{Database, ResolveConfig, ResolveError};
use reportxml_test_utils::{
    definition, node, reference_to, report_with, state_with_text, templated_definition, text,
};

fn db_from(xml: &str) -> Database {
    let db = Database::new();
    db.add_report_xml(xml).unwrap();
    db
}

#[test]
fn test_state_definition_builds_wrapped_report() {
    let db = db_from(
        r#"<report><definition defines="d1"><state><text>ok</text></state></definition></report>"#,
    );

    let report = db.build_report("d1", None).unwrap();
    assert_eq!(
        report.to_xml_string().unwrap(),
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<report version="0.0.1" xmlns="http://icecast.org/specs/reportxml-0.0.1">"#,
            r#"<incident><state definition="d1"><text>ok</text></state></incident>"#,
            r#"</report>"#,
        )
    );
}

#[test]
fn test_incident_definition_attaches_to_root() {
    let db = db_from(
        r#"<report>
            <definition defines="d2">
                <incident><reason><text>because</text></reason></incident>
            </definition>
        </report>"#,
    );

    let report = db.build_report("d2", None).unwrap();
    let root = report.root();
    assert_eq!(root.child_count(), 1);

    let incident = root.child(0).unwrap();
    assert_eq!(incident.node_type(), NodeType::Incident);
    assert_eq!(incident.attribute("definition").as_deref(), Some("d2"));
    assert_eq!(
        report.render().child_elements().next().unwrap().attribute("definition"),
        Some("d2")
    );
}

#[test]
fn test_unsupported_classification() {
    let db = Database::new();
    db.add_report(&report_with(&[definition("t", &[text("loose")])]));

    assert_eq!(
        db.build_report("t", None).unwrap_err(),
        ResolveError::Unsupported {
            id: "t".to_string(),
            found: NodeType::Text,
        }
    );
}

#[test]
fn test_mixed_children_classified_by_first() {
    let db = Database::new();
    db.add_report(&report_with(&[definition(
        "m",
        &[state_with_text("a"), node(NodeType::Timestamp)],
    )]));

    let report = db.build_report("m", None).unwrap();
    let incident = report.root().child(0).unwrap();
    assert_eq!(incident.child_count(), 2);

    let state = incident.child(0).unwrap();
    assert_eq!(state.attribute("definition").as_deref(), Some("m"));
    let timestamp = incident.child(1).unwrap();
    assert!(!timestamp.has_attribute("definition"));
}

#[test]
fn test_empty_definition_builds_empty_report() {
    let db = Database::new();
    db.add_report(&report_with(&[definition("empty", &[])]));

    let report = db.build_report("empty", None).unwrap();
    assert_eq!(report, Document::new());
}

#[test]
fn test_build_report_not_found() {
    let db = Database::new();
    let err = db.build_report("missing", None).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_dangling_reference_copied_literally() {
    let dangling = reference_to(NodeType::State, "x");
    dangling.add_child(&text("kept")).unwrap();

    let db = Database::new();
    db.add_report(&report_with(&[definition("d1", &[dangling])]));

    let resolved = db.build_node("d1", None).unwrap();
    let state = resolved.node.child(0).unwrap();
    assert_eq!(state.attribute("definition").as_deref(), Some("x"));
    assert_eq!(state.attribute(PRIVATE_DEFINITION_ATTR).as_deref(), Some("d1"));
    assert_eq!(state.child(0).unwrap().content().as_deref(), Some("kept"));
}

#[test]
fn test_reference_is_spliced() {
    let shared = definition("s", &[state_with_text("shared")]);

    let reference = reference_to(NodeType::State, "s");
    reference.add_child(&text("replaced")).unwrap();
    let incident = node(NodeType::Incident);
    incident.add_child(&reference).unwrap();
    let outer = definition("outer", &[incident]);

    let db = Database::new();
    db.add_report(&report_with(&[shared, outer]));

    let resolved = db.build_node("outer", None).unwrap();
    let incident = resolved.node.child(0).unwrap();
    assert_eq!(incident.child_count(), 1);

    let state = incident.child(0).unwrap();
    assert_eq!(state.attribute(PRIVATE_DEFINITION_ATTR).as_deref(), Some("s"));
    assert_eq!(state.child_count(), 1);
    assert_eq!(state.child(0).unwrap().content().as_deref(), Some("shared"));
}

#[test]
fn test_template_inheritance() {
    let base = definition("base", &[state_with_text("from base")]);
    let derived = templated_definition("derived", "base", &[state_with_text("own")]);

    let db = Database::new();
    db.add_report(&report_with(&[base, derived]));

    let resolved = db.build_node("derived", None).unwrap();
    assert_eq!(resolved.uniform_type, Some(NodeType::State));

    let contents: Vec<_> = resolved
        .node
        .children()
        .iter()
        .map(|state| state.child(0).unwrap().content().unwrap())
        .collect();
    assert_eq!(contents, vec!["from base".to_string(), "own".to_string()]);

    for state in resolved.node.children() {
        assert_eq!(state.attribute(PRIVATE_DEFINITION_ATTR).as_deref(), Some("derived"));
    }
}

#[test]
fn test_missing_template_propagates() {
    let db = Database::new();
    db.add_report(&report_with(&[templated_definition("d", "gone", &[])]));

    assert_eq!(
        db.build_node("d", None).unwrap_err(),
        ResolveError::NotFound {
            id: "gone".to_string()
        }
    );
}

#[test]
fn test_self_reference_terminates() {
    let db = Database::new();
    db.add_report(&report_with(&[definition(
        "loop",
        &[reference_to(NodeType::State, "loop")],
    )]));

    let resolved = db.build_node("loop", None).unwrap();
    assert_eq!(resolved.node.child_count(), 1);
    assert_eq!(
        resolved.node.child(0).unwrap().attribute("definition").as_deref(),
        Some("loop")
    );
}

#[test]
fn test_config_serde() {
    let config = ResolveConfig::new().with_default_depth(3);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"default_depth":3}"#);

    let back: ResolveConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let defaulted: ResolveConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaulted, ResolveConfig::default());
}

fn template_cycle() -> Database {
    let db = Database::new();
    db.add_report(&report_with(&[
        templated_definition("a", "b", &[state_with_text("a")]),
        templated_definition("b", "a", &[state_with_text("b")]),
    ]));
    db
}

fn template_chain(len: usize) -> Database {
    let links: Vec<_> = (0..len)
        .map(|i| {
            let id = format!("c{i}");
            if i + 1 < len {
                templated_definition(&id, &format!("c{}", i + 1), &[state_with_text(&id)])
            } else {
                definition(&id, &[state_with_text(&id)])
            }
        })
        .collect();

    let db = Database::new();
    db.add_report(&report_with(&links));
    db
}

proptest! {
    #[test]
    fn prop_template_cycle_terminates(depth in 0u32..40) {
        let db = template_cycle();
        let err = db.build_node("a", Some(depth)).unwrap_err();
        prop_assert!(err.is_not_found());
    }

    #[test]
    fn prop_reference_cycle_terminates(depth in 1u32..12) {
        let db = Database::new();
        db.add_report(&report_with(&[
            definition("x", &[reference_to(NodeType::State, "y")]),
            definition("y", &[reference_to(NodeType::State, "x")]),
        ]));

        let resolved = db.build_node("x", Some(depth)).unwrap();
        prop_assert_eq!(resolved.node.child_count(), 1);
        prop_assert_eq!(resolved.uniform_type, Some(NodeType::State));
    }

    #[test]
    fn prop_template_chain_needs_one_unit_per_link(len in 1usize..8, depth in 0u32..10) {
        let db = template_chain(len);
        let result = db.build_node("c0", Some(depth));

        if depth as usize >= len {
            let resolved = result.unwrap();
            prop_assert_eq!(resolved.node.child_count(), len);
        } else {
            prop_assert!(result.unwrap_err().is_not_found());
        }
    }
}
