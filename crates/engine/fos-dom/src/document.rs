//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
///
/// A `DomTree` pre-populated with `<html>`, `<head>` and `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a new document with the basic html/head/body structure
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.push_element(tree.root(), "html");
        let head = tree.push_element(html, "head");
        let body = tree.push_element(html, "body");

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Consume the document, keeping only its tree
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Text of the first `<title>` in `<head>`, trimmed
    pub fn title(&self) -> String {
        self.tree
            .children(self.head_element)
            .iter()
            .find(|&&c| self.tree.tag_name(c) == Some("title"))
            .map(|&title| self.tree.text_content(title).trim().to_string())
            .unwrap_or_default()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
