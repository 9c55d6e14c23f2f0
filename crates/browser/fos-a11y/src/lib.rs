//! fOS Accessibility
//!
//! Accessibility auditing for the fOS browser engine.
//!
//! Features:
//! - WCAG color contrast math (luminance, compositing, effective background)
//! - Pluggable audit rules with shadow-piercing queries
//! - Eager and cooperative (idle-time, cancellable) scan scheduling
//! - Built-in contrast and image text-alternative rules

pub mod audit;
pub mod config;
pub mod contrast;
pub mod rule;
pub mod rules;
pub mod scheduler;

pub use audit::Auditor;
pub use config::{AuditConfig, FailurePolicy, WcagLevel};
pub use contrast::ContrastChecker;
pub use rule::{rule_fn, AccessibilityError, AuditContext, FnRule, Rule, RuleError, RuleResult};
pub use rules::{default_rules, ContrastRule, ImageAltRule};
pub use scheduler::{
    request_idle_scan, scan, CancelToken, IdleDeadline, IdleHost, IdleScan, RuleFailure, ScanError,
    ScanReport, ScanState, TimedDeadline, TimedIdleHost, TurnOutcome,
};
