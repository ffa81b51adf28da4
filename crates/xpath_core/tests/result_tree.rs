use pretty_assertions::assert_eq;
use xpath_core::{parse_result_tree, render, PayloadError, ResultTree, TreeNode};

#[test]
fn nested_payload_keeps_order_and_ids() {
    let payload = r#"[
        {"id": "r", "text": "root", "children": [
            {"text": "first"},
            {"id": 42, "text": "second", "children": [{"text": "leaf"}]}
        ]},
        {"text": "other"}
    ]"#;
    let tree = parse_result_tree(Some(payload)).expect("valid payload");

    assert_eq!(
        tree,
        ResultTree {
            roots: vec![
                TreeNode::new(
                    "r",
                    "root",
                    vec![
                        TreeNode::new("0.0", "first", Vec::new()),
                        TreeNode::new("42", "second", vec![TreeNode::new("0.1.0", "leaf", Vec::new())]),
                    ],
                ),
                TreeNode::new("1", "other", Vec::new()),
            ],
        }
    );
    assert_eq!(tree.node_count(), 5);
}

#[test]
fn flat_payload_is_assembled_by_parent() {
    let payload = r##"[
        {"id": "a", "parent": "#", "text": "interfaces/interface", "icon": "fas fa-search-plus"},
        {"id": "b", "parent": "a", "text": "name"},
        {"id": "c", "parent": "b", "text": "ge-0/0/0"},
        {"id": "d", "parent": "#", "text": "system"},
        {"id": "e", "parent": "a", "text": "mtu"}
    ]"##;
    let tree = parse_result_tree(Some(payload)).expect("valid payload");

    let lines = render(&tree).lines();
    assert_eq!(
        lines,
        vec![
            "+ interfaces/interface",
            "  + name",
            "    - ge-0/0/0",
            "  - mtu",
            "- system",
        ]
    );
}

#[test]
fn flat_payload_with_unknown_parent_keeps_node_as_root() {
    let payload = r##"[
        {"id": "a", "parent": "#", "text": "a"},
        {"id": "b", "parent": "missing", "text": "orphan"}
    ]"##;
    let tree = parse_result_tree(Some(payload)).expect("valid payload");
    let labels: Vec<_> = tree.roots.iter().map(|node| node.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "orphan"]);
}

#[test]
fn flat_payload_drops_parent_cycles() {
    let payload = r##"[
        {"id": "a", "parent": "#", "text": "a"},
        {"id": "x", "parent": "y", "text": "x"},
        {"id": "y", "parent": "x", "text": "y"}
    ]"##;
    let tree = parse_result_tree(Some(payload)).expect("valid payload");
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn empty_array_is_an_empty_tree() {
    let tree = parse_result_tree(Some(" [] ")).expect("valid payload");
    assert!(tree.is_empty());
    assert!(render(&tree).is_empty());
}

#[test]
fn missing_or_invalid_payload_is_rejected() {
    assert_eq!(parse_result_tree(None), Err(PayloadError::Missing));
    assert_eq!(parse_result_tree(Some("   ")), Err(PayloadError::Missing));
    assert!(matches!(
        parse_result_tree(Some(r#"{"text":"a"}"#)),
        Err(PayloadError::Json(_))
    ));
    assert!(matches!(
        parse_result_tree(Some(r#"[{"children":[]}]"#)),
        Err(PayloadError::Json(_))
    ));
    assert!(matches!(
        parse_result_tree(Some("[] trailing")),
        Err(PayloadError::Json(_))
    ));
}

#[test]
fn rendering_twice_gives_equal_views() {
    let tree = parse_result_tree(Some(r#"[{"text":"a","children":[{"text":"b"}]}]"#))
        .expect("valid payload");
    let first = render(&tree);
    let second = render(&tree);
    assert_eq!(first, second);
    assert_eq!(first.rows.len(), 2);
}

#[test]
fn deep_flat_tree_renders_every_level() {
    let depth = 100_000;
    let mut payload = String::from("[");
    for level in 0..depth {
        if level > 0 {
            payload.push(',');
        }
        let parent = if level == 0 {
            "#".to_string()
        } else {
            format!("n{}", level - 1)
        };
        payload.push_str(&format!(
            r#"{{"id":"n{level}","parent":"{parent}","text":"level {level}"}}"#
        ));
    }
    payload.push(']');

    let tree = parse_result_tree(Some(&payload)).expect("valid payload");
    assert_eq!(tree.node_count(), depth);
    let view = render(&tree);
    assert_eq!(view.rows.len(), depth);
    assert_eq!(view.rows[depth - 1].depth, depth - 1);
    assert_eq!(view.rows[depth - 1].label, format!("level {}", depth - 1));
    drop(tree);
}

#[test]
fn deep_nested_payload_parses_renders_and_drops() {
    let depth = 100_000;
    let mut payload = String::with_capacity(depth * 32);
    for _ in 0..depth {
        payload.push_str(r#"[{"text":"n","children":"#);
    }
    payload.push_str("[]");
    for _ in 0..depth {
        payload.push_str("}]");
    }

    let tree = parse_result_tree(Some(&payload)).expect("valid payload");
    assert_eq!(tree.node_count(), depth);
    let view = render(&tree);
    assert_eq!(view.rows.len(), depth);
    assert_eq!(view.rows[depth - 1].depth, depth - 1);
    assert_eq!(view.rows[2].id, "0.0.0");
    drop(tree);
}

#[test]
fn deep_nested_payload_with_trailing_garbage_is_rejected() {
    let depth = 100_000;
    let mut payload = String::with_capacity(depth * 32);
    for _ in 0..depth {
        payload.push_str(r#"[{"text":"n","children":"#);
    }
    payload.push_str("[]");
    for _ in 0..depth {
        payload.push_str("}]");
    }
    payload.push_str(" x");

    assert!(matches!(
        parse_result_tree(Some(&payload)),
        Err(PayloadError::Json(_))
    ));
}
