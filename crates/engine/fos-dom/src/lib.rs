//! fOS DOM - Document Object Model
//!
//! Arena-backed document tree with shadow roots, a selector engine for
//! shallow (per-scope) queries, and shadow-piercing queries on top of it.

mod node;
mod tree;
mod document;
pub mod shadow;
pub mod selectors;
pub mod query;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Descendants};
pub use document::Document;
pub use shadow::{ShadowRoot, ShadowRootMode, ShadowRootInit};
pub use selectors::Selector;
pub use query::{query_all, query_all_parsed, query_first, QueryOptions};

use serde::{Deserialize, Serialize};

/// Node identifier (index into arena)
///
/// Identity is positional: two ids are the same node iff they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node of every tree)
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// DOM errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("{0} is not an element")]
    NotAnElement(NodeId),

    #[error("{0} already hosts a shadow root")]
    ShadowAlreadyAttached(NodeId),

    #[error("Cannot insert {child} under {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
