//! Audit Rules
//!
//! A rule inspects the subtree under a root and reports violations. Rules
//! are values behind one trait, so a rule set is just an ordered list.

use fos_css::{StyleError, StyleSource};
use fos_dom::{query_all, query_first, DomError, DomTree, NodeId};
use serde::{Deserialize, Serialize};

use crate::config::AuditConfig;

/// A reported accessibility violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityError {
    /// Human-readable explanation
    pub text: String,
    /// Documentation for the violated criterion
    pub url: String,
    /// Offending nodes
    pub elements: Vec<NodeId>,
}

impl AccessibilityError {
    pub fn new(text: impl Into<String>, url: impl Into<String>, element: NodeId) -> Self {
        Self::with_elements(text, url, vec![element])
    }

    pub fn with_elements(text: impl Into<String>, url: impl Into<String>, elements: Vec<NodeId>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            elements,
        }
    }

    /// First offending node
    pub fn element(&self) -> Option<NodeId> {
        self.elements.first().copied()
    }
}

/// Why a rule could not finish
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Query(#[from] DomError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error("{0}")]
    Failed(String),
}

pub type RuleResult = Result<Vec<AccessibilityError>, RuleError>;

/// Everything a rule may read while it runs
#[derive(Clone, Copy)]
pub struct AuditContext<'a> {
    pub tree: &'a DomTree,
    pub styles: &'a dyn StyleSource,
    pub config: &'a AuditConfig,
}

impl<'a> AuditContext<'a> {
    pub fn new(tree: &'a DomTree, styles: &'a dyn StyleSource, config: &'a AuditConfig) -> Self {
        Self { tree, styles, config }
    }

    /// Shadow-piercing query bounded by the configured depth
    pub fn query_all(&self, selector: &str, root: NodeId) -> Result<Vec<NodeId>, DomError> {
        query_all(self.tree, selector, root, self.config.query_options())
    }

    pub fn query_first(&self, selector: &str, root: NodeId) -> Result<Option<NodeId>, DomError> {
        query_first(self.tree, selector, root, self.config.query_options())
    }
}

impl std::fmt::Debug for AuditContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditContext")
            .field("nodes", &self.tree.len())
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// An accessibility check
///
/// Rules must be deterministic for a given tree and must not mutate it.
pub trait Rule {
    /// Stable identifier used in logs and failure reports
    fn name(&self) -> &str;

    /// Report violations under `root` (inclusive)
    fn check(&self, ctx: &AuditContext<'_>, root: NodeId) -> RuleResult;
}

/// Rule backed by a closure
pub struct FnRule<F> {
    name: String,
    check: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&AuditContext<'_>, NodeId) -> RuleResult,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, ctx: &AuditContext<'_>, root: NodeId) -> RuleResult {
        (self.check)(ctx, root)
    }
}

impl<F> std::fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Wrap a closure as a rule
pub fn rule_fn<F>(name: impl Into<String>, check: F) -> FnRule<F>
where
    F: Fn(&AuditContext<'_>, NodeId) -> RuleResult,
{
    FnRule { name: name.into(), check }
}
