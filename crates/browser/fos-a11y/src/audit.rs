//! Accessibility Audit
//!
//! `Auditor` binds a rule list and configuration for repeated scans.

use fos_css::StyleSource;
use fos_dom::{DomError, DomTree, NodeId};

use crate::config::AuditConfig;
use crate::rule::{AuditContext, Rule};
use crate::rules::default_rules;
use crate::scheduler::{self, CancelToken, IdleHost, ScanError, ScanReport, TimedIdleHost};

/// Runs a fixed rule list against documents
pub struct Auditor {
    rules: Vec<Box<dyn Rule>>,
    config: AuditConfig,
}

impl Default for Auditor {
    fn default() -> Self {
        Self::with_default_rules(AuditConfig::default())
    }
}

impl Auditor {
    /// Auditor with no rules
    pub fn new(config: AuditConfig) -> Self {
        Self { rules: Vec::new(), config }
    }

    /// Auditor with the built-in rule set
    pub fn with_default_rules(config: AuditConfig) -> Self {
        Self { rules: default_rules(), config }
    }

    /// Append a rule; rules run in the order they were added
    pub fn add_rule(&mut self, rule: impl Rule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    fn resolve_root(tree: &DomTree, root: Option<NodeId>) -> Result<NodeId, ScanError> {
        let root = root.unwrap_or_else(|| tree.root());
        if !tree.contains(root) {
            return Err(DomError::UnknownNode(root).into());
        }
        Ok(root)
    }

    /// Eager scan; `root` defaults to the whole document
    pub fn scan(&self, tree: &DomTree, styles: &dyn StyleSource, root: Option<NodeId>) -> Result<ScanReport, ScanError> {
        let root = Self::resolve_root(tree, root)?;
        let ctx = AuditContext::new(tree, styles, &self.config);
        scheduler::scan(&ctx, root, &self.rules)
    }

    /// Cooperative scan driven by `host`
    pub async fn request_idle_scan_with<H: IdleHost>(
        &self,
        tree: &DomTree,
        styles: &dyn StyleSource,
        root: Option<NodeId>,
        host: &H,
        cancel: Option<CancelToken>,
    ) -> Result<ScanReport, ScanError> {
        let root = Self::resolve_root(tree, root)?;
        let ctx = AuditContext::new(tree, styles, &self.config);
        scheduler::request_idle_scan(&ctx, root, &self.rules, host, cancel).await
    }

    /// Cooperative scan on a timed host using the configured turn budget
    pub async fn request_idle_scan(
        &self,
        tree: &DomTree,
        styles: &dyn StyleSource,
        root: Option<NodeId>,
        cancel: Option<CancelToken>,
    ) -> Result<ScanReport, ScanError> {
        let host = TimedIdleHost::new(self.config.turn_budget());
        self.request_idle_scan_with(tree, styles, root, &host, cancel).await
    }
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}
