use proptest::prelude::*;
use proptest::sample::select;
use reportxml_core::{
    lookup_by_type, ContentClass, Node, NodeType, SchemaViolation, PRIVATE_DEFINITION_ATTR,
};
use reportxml_test_utils::{node, text};

fn any_type() -> impl Strategy<Value = NodeType> {
    select(NodeType::ALL.to_vec())
}

#[test]
fn test_every_type_name_round_trips() {
    for t in NodeType::ALL {
        assert_eq!(t.name().parse::<NodeType>(), Ok(t));
        assert_eq!(lookup_by_type(t).node_type, t);
    }
    assert!("html".parse::<NodeType>().is_err());
}

#[test]
fn test_with_identity_drops_partial_node() {
    // report carries no `definition` attribute
    let err = Node::with_identity(NodeType::Report, Some("r"), Some("d"), None).unwrap_err();
    assert_eq!(
        err,
        SchemaViolation::UnknownAttribute {
            node_type: NodeType::Report,
            name: "definition".to_string(),
        }
    );
}

#[test]
fn test_position_attributes_accept_free_text() {
    let pos = node(NodeType::Position);
    pos.set_attribute("line", "42:7").unwrap();
    pos.set_attribute("offset", "-").unwrap();
    pos.set_attribute("offset", "0x1F").unwrap();

    assert_eq!(pos.attribute("line").as_deref(), Some("42:7"));
    assert_eq!(pos.attribute("offset").as_deref(), Some("0x1F"));
    assert!(matches!(
        pos.set_attribute("column", "3"),
        Err(SchemaViolation::UnknownAttribute { .. })
    ));
}

#[test]
fn test_enumerated_types() {
    let action = node(NodeType::Action);
    action.set_attribute("type", "see-other").unwrap();
    assert!(matches!(
        action.set_attribute("type", "explode"),
        Err(SchemaViolation::ValueNotAllowed { .. })
    ));

    let text = node(NodeType::Text);
    text.set_attribute("dir", "rtl").unwrap();
    assert!(text.set_attribute("dir", "up").is_err());
}

#[test]
fn test_private_marker_is_settable_and_copied() {
    let state = node(NodeType::State);
    state.set_attribute(PRIVATE_DEFINITION_ATTR, "d1").unwrap();

    let copy = state.deep_copy();
    assert_eq!(copy.attribute(PRIVATE_DEFINITION_ATTR).as_deref(), Some("d1"));
}

#[test]
fn test_structural_equality_ignores_identity() {
    let a = node(NodeType::Reason);
    a.add_child(&text("why")).unwrap();
    let b = node(NodeType::Reason);
    b.add_child(&text("why")).unwrap();

    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));

    b.add_child(&text("more")).unwrap();
    assert_ne!(a, b);
}

proptest! {
    #[test]
    fn prop_defaults_applied_for_every_type(t in any_type()) {
        let n = Node::new(t).unwrap();
        let defaults: Vec<_> = lookup_by_type(t)
            .attributes
            .iter()
            .filter_map(|spec| spec.default.map(|d| (spec.name.to_string(), d.to_string())))
            .collect();

        prop_assert_eq!(n.attributes(), defaults);
        prop_assert_eq!(n.child_count(), 0);
        prop_assert_eq!(n.content(), None);
    }

    #[test]
    fn prop_child_attach_follows_schema(parent_type in any_type(), child_type in any_type()) {
        let parent = Node::new(parent_type).unwrap();
        let child = Node::new(child_type).unwrap();
        let schema = lookup_by_type(parent_type);

        let result = parent.add_child(&child);
        if schema.permits_child(child_type) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(parent.child_count(), 1);
            prop_assert!(parent.child(0).unwrap().ptr_eq(&child));
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(parent.child_count(), 0);
            if schema.content == ContentClass::Children {
                let is_not_permitted = matches!(result, Err(SchemaViolation::ChildNotPermitted { .. }));
                prop_assert!(is_not_permitted);
            }
        }
    }

    #[test]
    fn prop_rejected_attribute_leaves_map_unchanged(
        t in any_type(),
        name in "[a-z_]{1,10}",
        value in "[ -~]{0,12}",
    ) {
        let n = Node::new(t).unwrap();
        let before = n.attributes();

        match n.set_attribute(&name, &value) {
            Ok(()) => {
                prop_assert!(lookup_by_type(t).attribute(&name).is_some());
                prop_assert_eq!(n.attribute(&name), Some(value.clone()));
            }
            Err(_) => {
                prop_assert_eq!(n.attributes(), before);
            }
        }
    }

    #[test]
    fn prop_position_line_and_offset_take_any_text(line in "[ -~]{0,16}", offset in "[ -~]{0,16}") {
        let pos = Node::new(NodeType::Position).unwrap();
        prop_assert!(pos.set_attribute("line", &line).is_ok());
        prop_assert!(pos.set_attribute("offset", &offset).is_ok());
        prop_assert_eq!(pos.attribute("line"), Some(line.clone()));
    }
}
