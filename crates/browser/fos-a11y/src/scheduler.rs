//! Rule Scheduler
//!
//! Runs an ordered rule list against a root, either all at once (`scan`) or
//! in time-sliced turns (`IdleScan`) so a large audit never holds the host
//! for longer than one rule. Turns only end between rules.
//!
//! Both modes produce the same report for the same rules and tree:
//! violations in rule order, then in the order each rule found them.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fos_dom::{DomError, NodeId};
use serde::Serialize;

use crate::config::FailurePolicy;
use crate::rule::{AccessibilityError, AuditContext, Rule, RuleError};

/// Outcome of a scan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub violations: Vec<AccessibilityError>,
    /// Rules that errored under `FailurePolicy::Isolate`
    pub failures: Vec<RuleFailure>,
}

impl ScanReport {
    /// No violations and no failed rules
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.failures.is_empty()
    }
}

/// A rule that could not finish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFailure {
    pub rule: String,
    pub message: String,
}

/// Scan errors
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Rule `{rule}` failed: {source}")]
    RuleFailed {
        rule: String,
        #[source]
        source: RuleError,
    },

    #[error("Scan cancelled after {completed} rules")]
    Cancelled { completed: usize, partial: ScanReport },

    #[error("Scan already finished")]
    AlreadyFinished,

    #[error(transparent)]
    Query(#[from] DomError),
}

/// Run one rule and fold its outcome into `report`
fn run_rule(
    ctx: &AuditContext<'_>,
    root: NodeId,
    rule: &dyn Rule,
    report: &mut ScanReport,
) -> Result<(), ScanError> {
    match rule.check(ctx, root) {
        Ok(violations) => {
            tracing::trace!("Rule `{}` reported {} violations", rule.name(), violations.len());
            report.violations.extend(violations);
            Ok(())
        }
        Err(err) => match ctx.config.failure_policy {
            FailurePolicy::Isolate => {
                tracing::warn!("Rule `{}` failed: {}", rule.name(), err);
                report.failures.push(RuleFailure {
                    rule: rule.name().to_string(),
                    message: err.to_string(),
                });
                Ok(())
            }
            FailurePolicy::FailFast => Err(ScanError::RuleFailed {
                rule: rule.name().to_string(),
                source: err,
            }),
        },
    }
}

/// Run every rule against `root` and return when all have run
pub fn scan(ctx: &AuditContext<'_>, root: NodeId, rules: &[Box<dyn Rule>]) -> Result<ScanReport, ScanError> {
    tracing::debug!("Scanning {} with {} rules", root, rules.len());

    let mut report = ScanReport::default();
    for rule in rules {
        run_rule(ctx, root, rule.as_ref(), &mut report)?;
    }

    tracing::debug!(
        "Scan of {} finished: {} violations, {} failed rules",
        root,
        report.violations.len(),
        report.failures.len()
    );
    Ok(report)
}

// ============================================================================
// Cooperative mode
// ============================================================================

/// Time budget handed out by the host for one turn
pub trait IdleDeadline {
    /// Time left before the host wants control back
    fn time_remaining(&self) -> Duration;

    /// The turn was forced by deadline pressure; keep going regardless of budget
    fn did_timeout(&self) -> bool;
}

/// Wall-clock deadline
#[derive(Debug, Clone, Copy)]
pub struct TimedDeadline {
    start: Instant,
    budget: Duration,
    forced: bool,
}

impl TimedDeadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
            forced: false,
        }
    }

    /// A turn that runs to completion whatever the budget says
    pub fn forced(budget: Duration) -> Self {
        Self {
            forced: true,
            ..Self::new(budget)
        }
    }
}

impl IdleDeadline for TimedDeadline {
    fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }

    fn did_timeout(&self) -> bool {
        self.forced
    }
}

/// Shared flag for abandoning an in-flight scan
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Cooperative scan state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No turn taken yet
    Idle,
    /// Inside or between turns
    Running { turns: usize },
    Resolved,
    Cancelled,
    /// A rule failed under `FailurePolicy::FailFast`
    Failed,
}

impl ScanState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled | Self::Failed)
    }
}

/// What a turn ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Budget ran out with rules still queued
    Yielded,
    /// Every rule has run
    Resolved,
}

/// Step-driven cooperative scan
///
/// Each `step` drains the rule queue while the deadline has time left (or
/// is forced), then yields. Cancellation is checked before every rule.
pub struct IdleScan<'r> {
    root: NodeId,
    queue: VecDeque<&'r dyn Rule>,
    report: ScanReport,
    state: ScanState,
    completed: usize,
    cancel: Option<CancelToken>,
}

impl<'r> IdleScan<'r> {
    pub fn new(root: NodeId, rules: &'r [Box<dyn Rule>]) -> Self {
        Self {
            root,
            queue: rules.iter().map(|rule| rule.as_ref() as &dyn Rule).collect(),
            report: ScanReport::default(),
            state: ScanState::Idle,
            completed: 0,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Rules still queued
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Rules run so far
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Results accumulated so far
    pub fn report(&self) -> &ScanReport {
        &self.report
    }

    pub fn into_report(self) -> ScanReport {
        self.report
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn cancelled(&mut self) -> ScanError {
        tracing::debug!("Scan of {} cancelled after {} rules", self.root, self.completed);
        self.state = ScanState::Cancelled;
        ScanError::Cancelled {
            completed: self.completed,
            partial: std::mem::take(&mut self.report),
        }
    }

    /// Run one turn
    pub fn step(&mut self, ctx: &AuditContext<'_>, deadline: &dyn IdleDeadline) -> Result<TurnOutcome, ScanError> {
        let turns = match self.state {
            ScanState::Idle => 1,
            ScanState::Running { turns } => turns + 1,
            ScanState::Resolved => return Ok(TurnOutcome::Resolved),
            ScanState::Cancelled | ScanState::Failed => return Err(ScanError::AlreadyFinished),
        };
        self.state = ScanState::Running { turns };
        tracing::trace!(
            "Turn {} of scan on {}: {} rules queued, forced: {}",
            turns,
            self.root,
            self.queue.len(),
            deadline.did_timeout()
        );

        while !self.queue.is_empty() && (deadline.time_remaining() > Duration::ZERO || deadline.did_timeout()) {
            if self.is_cancelled() {
                return Err(self.cancelled());
            }
            let Some(rule) = self.queue.pop_front() else {
                break;
            };
            if let Err(err) = run_rule(ctx, self.root, rule, &mut self.report) {
                self.state = ScanState::Failed;
                return Err(err);
            }
            self.completed += 1;
        }

        if self.queue.is_empty() {
            tracing::debug!(
                "Scan of {} resolved after {} turns: {} violations",
                self.root,
                turns,
                self.report.violations.len()
            );
            self.state = ScanState::Resolved;
            Ok(TurnOutcome::Resolved)
        } else if self.is_cancelled() {
            Err(self.cancelled())
        } else {
            Ok(TurnOutcome::Yielded)
        }
    }

    /// Drive turns back to back, asking `next_deadline` for each budget
    pub fn run_to_completion<D, F>(mut self, ctx: &AuditContext<'_>, mut next_deadline: F) -> Result<ScanReport, ScanError>
    where
        D: IdleDeadline,
        F: FnMut() -> D,
    {
        loop {
            let deadline = next_deadline();
            if self.step(ctx, &deadline)? == TurnOutcome::Resolved {
                return Ok(self.into_report());
            }
        }
    }
}

impl std::fmt::Debug for IdleScan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdleScan")
            .field("root", &self.root)
            .field("remaining", &self.queue.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Source of idle turns
pub trait IdleHost {
    type Deadline: IdleDeadline;

    /// Resolves when the host has idle time to give
    fn request_idle(&self) -> impl Future<Output = Self::Deadline>;
}

/// Yields to the executor between turns and grants a fixed budget
#[derive(Debug, Clone, Copy)]
pub struct TimedIdleHost {
    budget: Duration,
}

impl TimedIdleHost {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }
}

impl IdleHost for TimedIdleHost {
    type Deadline = TimedDeadline;

    async fn request_idle(&self) -> TimedDeadline {
        smol::future::yield_now().await;
        // A zero budget would never admit a rule
        if self.budget.is_zero() {
            TimedDeadline::forced(self.budget)
        } else {
            TimedDeadline::new(self.budget)
        }
    }
}

/// Cooperative scan: one turn per idle period until every rule has run
pub async fn request_idle_scan<H: IdleHost>(
    ctx: &AuditContext<'_>,
    root: NodeId,
    rules: &[Box<dyn Rule>],
    host: &H,
    cancel: Option<CancelToken>,
) -> Result<ScanReport, ScanError> {
    tracing::debug!("Idle scan of {} with {} rules", root, rules.len());

    let mut scan = IdleScan::new(root, rules);
    if let Some(token) = cancel {
        scan = scan.with_cancel(token);
    }

    loop {
        let deadline = host.request_idle().await;
        if scan.step(ctx, &deadline)? == TurnOutcome::Resolved {
            return Ok(scan.into_report());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::rule::rule_fn;
    use fos_css::InlineStyleSource;
    use fos_dom::DomTree;
    use std::cell::Cell;

    /// Deadline that allows a fixed number of rules
    struct Rules(Cell<usize>);

    impl IdleDeadline for Rules {
        fn time_remaining(&self) -> Duration {
            let left = self.0.get();
            self.0.set(left.saturating_sub(1));
            if left > 0 { Duration::from_millis(1) } else { Duration::ZERO }
        }

        fn did_timeout(&self) -> bool {
            false
        }
    }

    fn numbered(n: usize) -> Vec<Box<dyn Rule>> {
        (0..n)
            .map(|i| {
                Box::new(rule_fn(format!("rule-{}", i), move |_: &AuditContext<'_>, root| {
                    Ok(vec![AccessibilityError::new(format!("#{}", i), "https://example.com", root)])
                })) as Box<dyn Rule>
            })
            .collect()
    }

    #[test]
    fn test_step_yields_and_resolves() {
        let tree = DomTree::new();
        let styles = InlineStyleSource::new();
        let config = AuditConfig::default();
        let ctx = AuditContext::new(&tree, &styles, &config);
        let rules = numbered(5);

        let mut scan = IdleScan::new(tree.root(), &rules);
        assert_eq!(scan.state(), ScanState::Idle);

        assert_eq!(scan.step(&ctx, &Rules(Cell::new(2))).unwrap(), TurnOutcome::Yielded);
        assert_eq!(scan.state(), ScanState::Running { turns: 1 });
        assert_eq!(scan.remaining(), 3);

        assert_eq!(scan.step(&ctx, &Rules(Cell::new(0))).unwrap(), TurnOutcome::Yielded);
        assert_eq!(scan.completed(), 2);

        assert_eq!(scan.step(&ctx, &Rules(Cell::new(3))).unwrap(), TurnOutcome::Resolved);
        assert_eq!(scan.state(), ScanState::Resolved);
        assert_eq!(scan.step(&ctx, &Rules(Cell::new(3))).unwrap(), TurnOutcome::Resolved);
        assert_eq!(scan.into_report().violations.len(), 5);
    }

    #[test]
    fn test_forced_turn_ignores_budget() {
        let tree = DomTree::new();
        let styles = InlineStyleSource::new();
        let config = AuditConfig::default();
        let ctx = AuditContext::new(&tree, &styles, &config);
        let rules = numbered(20);

        let mut scan = IdleScan::new(tree.root(), &rules);
        let outcome = scan.step(&ctx, &TimedDeadline::forced(Duration::ZERO)).unwrap();
        assert_eq!(outcome, TurnOutcome::Resolved);
        assert_eq!(scan.completed(), 20);
    }

    #[test]
    fn test_empty_rule_list_resolves_first_turn() {
        let tree = DomTree::new();
        let styles = InlineStyleSource::new();
        let config = AuditConfig::default();
        let ctx = AuditContext::new(&tree, &styles, &config);

        let mut scan = IdleScan::new(tree.root(), &[]);
        assert_eq!(scan.step(&ctx, &Rules(Cell::new(0))).unwrap(), TurnOutcome::Resolved);
        assert!(scan.report().is_clean());
    }

    #[test]
    fn test_cancel_before_first_rule() {
        let tree = DomTree::new();
        let styles = InlineStyleSource::new();
        let config = AuditConfig::default();
        let ctx = AuditContext::new(&tree, &styles, &config);
        let rules = numbered(3);
        let token = CancelToken::new();
        token.cancel();

        let mut scan = IdleScan::new(tree.root(), &rules).with_cancel(token);
        match scan.step(&ctx, &Rules(Cell::new(10))) {
            Err(ScanError::Cancelled { completed, partial }) => {
                assert_eq!(completed, 0);
                assert!(partial.violations.is_empty());
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
        assert_eq!(scan.state(), ScanState::Cancelled);
        assert!(matches!(scan.step(&ctx, &Rules(Cell::new(10))), Err(ScanError::AlreadyFinished)));
    }

    #[test]
    fn test_zero_budget_host_still_progresses() {
        let tree = DomTree::new();
        let styles = InlineStyleSource::new();
        let config = AuditConfig::default();
        let ctx = AuditContext::new(&tree, &styles, &config);
        let rules = numbered(6);

        let host = TimedIdleHost::new(Duration::ZERO);
        let report = smol::block_on(request_idle_scan(&ctx, tree.root(), &rules, &host, None)).unwrap();
        assert_eq!(report.violations.len(), 6);
    }

    #[test]
    fn test_trace_logging_does_not_spend_budget() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let tree = DomTree::new();
        let styles = InlineStyleSource::new();
        let config = AuditConfig::default();
        let ctx = AuditContext::new(&tree, &styles, &config);
        let rules = numbered(5);

        let mut scan = IdleScan::new(tree.root(), &rules);
        assert_eq!(scan.step(&ctx, &Rules(Cell::new(2))).unwrap(), TurnOutcome::Yielded);
        assert_eq!(scan.completed(), 2);
        assert_eq!(scan.step(&ctx, &Rules(Cell::new(3))).unwrap(), TurnOutcome::Resolved);
    }
}
