//! Shadow-piercing queries
//!
//! `DomTree::query_selector_all` only sees one scope. The functions here
//! repeat that shallow query inside every open shadow root reachable from
//! the starting node, so callers can search a component tree as if it had
//! no encapsulation boundaries. Closed shadow roots are never entered.
//!
//! Results are in visit order: the light tree of the root first, then each
//! shadow scope in the order its host was discovered.

use std::collections::{HashSet, VecDeque};

use crate::{DomError, DomTree, NodeId, Selector};

/// Options for shadow-piercing queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Maximum number of shadow boundaries to cross (`None` = unbounded)
    pub max_depth: Option<usize>,
}

impl QueryOptions {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth: Some(max_depth) }
    }

    fn allows(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth <= max)
    }
}

/// All elements matching `selector` at or below `root`, across open shadow roots
///
/// A malformed selector is a caller bug and is returned as an error.
pub fn query_all(
    tree: &DomTree,
    selector: &str,
    root: NodeId,
    options: QueryOptions,
) -> Result<Vec<NodeId>, DomError> {
    let selector = Selector::parse(selector)?;
    Ok(query_all_parsed(tree, &selector, root, options))
}

/// First element `query_all` would return
pub fn query_first(
    tree: &DomTree,
    selector: &str,
    root: NodeId,
    options: QueryOptions,
) -> Result<Option<NodeId>, DomError> {
    let selector = Selector::parse(selector)?;
    if !tree.contains(root) {
        return Ok(None);
    }
    if selector.matches(tree, root) {
        return Ok(Some(root));
    }
    // The root's own scope is searched before any shadow root
    if let Some(hit) = tree.query_selector(root, &selector) {
        return Ok(Some(hit));
    }
    Ok(query_all_parsed(tree, &selector, root, options).into_iter().next())
}

/// `query_all` with an already parsed selector
pub fn query_all_parsed(
    tree: &DomTree,
    selector: &Selector,
    root: NodeId,
    options: QueryOptions,
) -> Vec<NodeId> {
    if !tree.contains(root) {
        return Vec::new();
    }

    // A document handle and its top element would otherwise match twice
    let root = if tree.is_document(root) {
        tree.document_element().unwrap_or(root)
    } else {
        root
    };

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut expanded: HashSet<NodeId> = HashSet::new();
    let mut results = Vec::new();
    let mut work: VecDeque<(NodeId, usize)> = VecDeque::new();

    if selector.matches(tree, root) && seen.insert(root) {
        results.push(root);
    }
    work.push_back((root, 0));
    if let Some(shadow) = tree.open_shadow_root(root) {
        if options.allows(1) && expanded.insert(shadow) {
            work.push_back((shadow, 1));
        }
    }

    while let Some((container, depth)) = work.pop_front() {
        tracing::trace!("Querying `{}` in {} at shadow depth {}", selector.as_str(), container, depth);

        for id in tree.query_selector_all(container, selector) {
            if seen.insert(id) {
                results.push(id);
            }
        }
        // Hosts are expanded whether or not they match themselves
        for id in tree.descendants(container) {
            if let Some(shadow) = tree.open_shadow_root(id) {
                if options.allows(depth + 1) && expanded.insert(shadow) {
                    work.push_back((shadow, depth + 1));
                }
            }
        }
    }

    results
}
