//! Comprehensive tests for fos-dom
//!
//! Shadow-piercing queries over realistic component trees.

use fos_dom::{query_all, query_first, Document, DomTree, NodeId, QueryOptions, ShadowRootInit};

/// Build `depth` nested open shadow roots under `host`, one `[data-x]` span per level
fn nested_components(tree: &mut DomTree, host: NodeId, depth: usize) -> Vec<NodeId> {
    let mut matches = Vec::new();
    let mut current = host;
    for level in 0..depth {
        let shadow = tree.attach_shadow(current, ShadowRootInit::open()).unwrap();
        let span = tree.append_element(shadow, "span").unwrap();
        tree.set_attribute(span, "data-x", level.to_string()).unwrap();
        matches.push(span);
        current = tree.append_element(shadow, "x-inner").unwrap();
    }
    matches
}

#[test]
fn test_finds_match_two_levels_deep() {
    let mut doc = Document::default();
    let body = doc.body();
    let tree = doc.tree_mut();

    let outer = tree.append_element(body, "x-outer").unwrap();
    let outer_shadow = tree.attach_shadow(outer, ShadowRootInit::open()).unwrap();
    let inner = tree.append_element(outer_shadow, "x-inner").unwrap();
    let inner_shadow = tree.attach_shadow(inner, ShadowRootInit::open()).unwrap();
    let target = tree.append_element(inner_shadow, "input").unwrap();
    tree.set_attribute(target, "data-x", "").unwrap();

    let found = query_all(doc.tree(), "[data-x]", body, QueryOptions::default()).unwrap();
    assert_eq!(found, vec![target]);
}

#[test]
fn test_closed_shadow_is_opaque() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "div").unwrap();
    let shadow = tree.attach_shadow(root, ShadowRootInit::closed()).unwrap();
    let button = tree.append_element(shadow, "button").unwrap();
    tree.set_attribute(button, "data-x", "").unwrap();

    for selector in ["[data-x]", "button", "*"] {
        let found = query_all(&tree, selector, root, QueryOptions::default()).unwrap();
        assert!(!found.contains(&button), "closed shadow leaked for {}", selector);
    }
    assert!(query_all(&tree, "[data-x]", root, QueryOptions::default()).unwrap().is_empty());
}

#[test]
fn test_unbounded_depth_finds_every_level() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "x-root").unwrap();
    let expected = nested_components(&mut tree, root, 12);

    let found = query_all(&tree, "[data-x]", root, QueryOptions::unbounded()).unwrap();
    assert_eq!(found, expected);
}

#[test]
fn test_max_depth_limits_levels() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "x-root").unwrap();
    let expected = nested_components(&mut tree, root, 6);

    for k in 0..=8 {
        let found = query_all(&tree, "[data-x]", root, QueryOptions::with_max_depth(k)).unwrap();
        assert_eq!(found, expected[..k.min(6)], "max_depth = {}", k);
    }
}

#[test]
fn test_no_duplicates() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "section").unwrap();
    let shadow = tree.attach_shadow(root, ShadowRootInit::open()).unwrap();
    for _ in 0..3 {
        let host = tree.append_element(shadow, "div").unwrap();
        let inner = tree.attach_shadow(host, ShadowRootInit::open()).unwrap();
        tree.append_element(inner, "div").unwrap();
    }
    tree.append_element(root, "div").unwrap();

    let found = query_all(&tree, "div, section, *", root, QueryOptions::default()).unwrap();
    let mut unique = found.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(found.len(), unique.len());
    assert_eq!(found.len(), 8);
}

#[test]
fn test_query_first_follows_visit_order() {
    let mut doc = Document::default();
    let body = doc.body();
    let tree = doc.tree_mut();
    let host = tree.append_element(body, "x-card").unwrap();
    let shadow = tree.attach_shadow(host, ShadowRootInit::open()).unwrap();
    tree.append_element(shadow, "img").unwrap();
    let light = tree.append_element(body, "img").unwrap();

    let first = query_first(doc.tree(), "img", doc.tree().root(), QueryOptions::default()).unwrap();
    assert_eq!(first, Some(light));
    assert_eq!(query_first(doc.tree(), "video", body, QueryOptions::default()).unwrap(), None);
}

#[test]
fn test_wide_tree() {
    let mut tree = DomTree::new();
    let root = tree.append_element(tree.root(), "ul").unwrap();
    for i in 0..1000 {
        let li = tree.append_element(root, "li").unwrap();
        if i % 10 == 0 {
            tree.set_attribute(li, "class", "tenth item").unwrap();
        }
    }

    let found = query_all(&tree, "ul > li.tenth", root, QueryOptions::default()).unwrap();
    assert_eq!(found.len(), 100);
}
