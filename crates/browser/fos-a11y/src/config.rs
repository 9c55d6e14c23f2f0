//! Audit Configuration

use std::time::Duration;

use fos_dom::QueryOptions;
use serde::{Deserialize, Serialize};

/// WCAG conformance level checked by contrast rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WcagLevel {
    /// 4.5:1 normal text, 3:1 large text
    #[default]
    Aa,
    /// 7:1 normal text, 4.5:1 large text
    Aaa,
}

/// What a scan does when a rule returns an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure in the report and keep going
    #[default]
    Isolate,
    /// Abort the scan with the rule's error
    FailFast,
}

/// Audit configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub failure_policy: FailurePolicy,

    /// Shadow boundaries rules may cross (None = unbounded)
    pub max_shadow_depth: Option<usize>,

    pub level: WcagLevel,

    /// Run the contrast rule
    pub check_contrast: bool,

    /// Per-turn budget of the timed idle host, in milliseconds
    pub turn_budget_ms: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Isolate,
            max_shadow_depth: None,
            level: WcagLevel::Aa,
            check_contrast: true,
            turn_budget_ms: 5,
        }
    }
}

impl AuditConfig {
    pub fn turn_budget(&self) -> Duration {
        Duration::from_millis(self.turn_budget_ms)
    }

    /// Query options every rule should use
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions { max_depth: self.max_shadow_depth }
    }
}
