//! DOM Tree (arena-based allocation)

use crate::{DomError, Node, NodeId, ShadowRoot, ShadowRootInit, ShadowRootMode};

/// Arena-based DOM tree
///
/// Index 0 is always the document node. Shadow roots are arena nodes too,
/// but they are never listed among their host's children.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only a document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree, shadow roots included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node exists from construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // --- Construction ---

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(Node::text(content))
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if parent_node.is_text()
            || child_node.is_document()
            || child_node.is_shadow_root()
            || parent == child
            || self.is_inclusive_ancestor(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        if let Some(old_parent) = child_node.parent {
            if let Some(old) = self.get_mut(old_parent) {
                old.children.retain(|&c| c != child);
            }
        }
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Create an element and append it in one go
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let id = self.create_element(tag);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it in one go
    pub fn append_text(&mut self, parent: NodeId, content: impl Into<String>) -> Result<NodeId, DomError> {
        let id = self.create_text(content);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append a fresh element to a node known to accept children
    pub(crate) fn push_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.push(Node::element(tag));
        self.nodes[id.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<(), DomError> {
        let node = self.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        let element = node.as_element_mut().ok_or(DomError::NotAnElement(id))?;
        element.set_attr(name, value);
        Ok(())
    }

    /// Attach a shadow root to `host` and return the root's id
    ///
    /// The returned id is the only way to reach the interior of a closed
    /// root, so the caller that builds the component keeps it.
    pub fn attach_shadow(&mut self, host: NodeId, init: ShadowRootInit) -> Result<NodeId, DomError> {
        let element = self.node(host)?.as_element().ok_or(DomError::NotAnElement(host))?;
        if element.has_shadow_root() {
            return Err(DomError::ShadowAlreadyAttached(host));
        }

        let root = self.push(Node::shadow_root(ShadowRoot::from_init(host, init)));
        if let Some(element) = self.nodes[host.index()].as_element_mut() {
            element.shadow_root = Some(root);
        }
        tracing::trace!("Attached {:?} shadow root {} to {}", init.mode, root, host);
        Ok(root)
    }

    // --- Navigation ---

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent element within the same scope (stops at shadow roots and the document)
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Parent in the composed tree: a shadow root's children continue at the host
    pub fn composed_parent(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if let Some(root) = node.as_shadow_root() {
            return Some(root.host);
        }
        let parent = node.parent?;
        match self.get(parent)?.as_shadow_root() {
            Some(root) => Some(root.host),
            None => Some(parent),
        }
    }

    /// Nearest element ancestor in the composed tree
    pub fn composed_parent_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.composed_parent(id);
        while let Some(candidate) = current {
            if self.is_element(candidate) {
                return Some(candidate);
            }
            current = self.composed_parent(candidate);
        }
        None
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.composed_parent(id);
        }
        false
    }

    /// Descendants of `scope` in tree order, excluding `scope` itself
    ///
    /// Does not enter shadow roots: this is the per-scope view a native
    /// query works on.
    pub fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(scope).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    // --- Element access ---

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    pub fn is_document(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_document)
    }

    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_shadow_root)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Shadow root of `host` if it is open
    pub fn open_shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.get(host)?.as_element()?.shadow_root?;
        self.get(root)?.as_shadow_root()?.is_open().then_some(root)
    }

    /// Mode of the shadow root attached to `host`, if any
    pub fn shadow_mode(&self, host: NodeId) -> Option<ShadowRootMode> {
        let root = self.get(host)?.as_element()?.shadow_root?;
        self.get(root)?.as_shadow_root().map(|r| r.mode)
    }

    /// First element child of the document
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root()).iter().copied().find(|&c| self.is_element(c))
    }

    /// Concatenated text of all light-tree text descendants
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    /// Text held by direct text children only
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|&c| self.get(c).and_then(Node::as_text))
            .collect()
    }
}

/// Pre-order iterator over a scope's light-tree descendants
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
