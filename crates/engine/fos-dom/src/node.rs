//! DOM Node
//!
//! Nodes live in the `DomTree` arena and refer to each other by `NodeId`.
//! A parent link is a plain id, never ownership.

use crate::{NodeId, ShadowRoot};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (None for the document and for shadow roots)
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Text(content.into()))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    pub(crate) fn shadow_root(root: ShadowRoot) -> Self {
        Self::with_data(NodeData::ShadowRoot(root))
    }

    fn with_data(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeData::Document)
    }

    #[inline]
    pub fn is_shadow_root(&self) -> bool {
        matches!(self.data, NodeData::ShadowRoot(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_shadow_root(&self) -> Option<&ShadowRoot> {
        match &self.data {
            NodeData::ShadowRoot(root) => Some(root),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Shadow root attached to a host element
    ShadowRoot(ShadowRoot),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name (ASCII lowercase)
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
    /// Attached shadow root, open or closed
    pub(crate) shadow_root: Option<NodeId>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            shadow_root: None,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            attr.value = value;
            return;
        }
        self.attrs.push(Attribute {
            name: name.to_ascii_lowercase(),
            value,
        });
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).value)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Whitespace-separated class list
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_shadow_root(&self) -> bool {
        self.shadow_root.is_some()
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
