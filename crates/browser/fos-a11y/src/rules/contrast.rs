//! Text color contrast

use fos_css::StyleError;
use fos_dom::NodeId;

use crate::config::WcagLevel;
use crate::contrast::ContrastChecker;
use crate::rule::{AccessibilityError, AuditContext, Rule, RuleError, RuleResult};

const URL_AA: &str = "https://www.w3.org/WAI/WCAG21/Understanding/contrast-minimum.html";
const URL_AAA: &str = "https://www.w3.org/WAI/WCAG21/Understanding/contrast-enhanced.html";

/// Flags text whose contrast against its background is below the
/// configured WCAG level
///
/// Text over a background image or gradient is always reported for manual
/// review, since the painted pixels are unknown. Elements whose colors
/// cannot be resolved, or whose styles are unreachable, are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastRule;

impl ContrastRule {
    /// Whether a background image shows through behind `node`
    fn has_background_image(ctx: &AuditContext<'_>, node: NodeId) -> Result<bool, StyleError> {
        let mut current = Some(node);
        while let Some(id) = current {
            if ctx.tree.is_element(id) {
                let style = ctx.styles.computed_style(ctx.tree, id)?;
                if style.has_background_image() {
                    return Ok(true);
                }
                let opaque = ContrastChecker::parse(&style.background_color, ctx.styles).is_some_and(|c| c.is_opaque());
                if opaque {
                    return Ok(false);
                }
            }
            current = ctx.tree.composed_parent(id);
        }
        Ok(false)
    }

    /// Whether an ancestor in the composed tree keeps `node` from rendering
    fn hidden_by_ancestor(ctx: &AuditContext<'_>, node: NodeId) -> Result<bool, StyleError> {
        let mut current = ctx.tree.composed_parent_element(node);
        while let Some(id) = current {
            if ctx.styles.computed_style(ctx.tree, id)?.hides_subtree() {
                return Ok(true);
            }
            current = ctx.tree.composed_parent_element(id);
        }
        Ok(false)
    }

    fn evaluate(&self, ctx: &AuditContext<'_>, node: NodeId) -> Result<Option<AccessibilityError>, StyleError> {
        let style = ctx.styles.computed_style(ctx.tree, node)?;
        if style.is_hidden() || Self::hidden_by_ancestor(ctx, node)? {
            return Ok(None);
        }

        let Some(foreground) = ContrastChecker::parse(&style.color, ctx.styles) else {
            tracing::warn!("Unresolvable text color `{}` on {}", style.color, node);
            return Ok(None);
        };
        let background = ContrastChecker::effective_background(ctx.tree, ctx.styles, node)?;
        let foreground = ContrastChecker::composite(foreground, background);

        let ratio = ContrastChecker::contrast_ratio(foreground, background);
        let large = ContrastChecker::is_large_text(&style);
        let level = ctx.config.level;
        let required = ContrastChecker::required_ratio(large, level);
        let url = match level {
            WcagLevel::Aa => URL_AA,
            WcagLevel::Aaa => URL_AAA,
        };

        if Self::has_background_image(ctx, node)? {
            return Ok(Some(AccessibilityError::new(
                format!(
                    "Text is over a background image or gradient; review contrast manually \
                     (against {} it is {:.2}:1, at least {}:1 required)",
                    ContrastChecker::format(background),
                    ratio,
                    required
                ),
                url,
                node,
            )));
        }

        if ContrastChecker::fails(ratio, large, level) {
            return Ok(Some(AccessibilityError::new(
                format!(
                    "Text has insufficient color contrast of {:.2}:1 ({} on {}); at least {}:1 required",
                    ratio,
                    ContrastChecker::format(foreground),
                    ContrastChecker::format(background),
                    required
                ),
                url,
                node,
            )));
        }
        Ok(None)
    }
}

impl Rule for ContrastRule {
    fn name(&self) -> &str {
        "color-contrast"
    }

    fn check(&self, ctx: &AuditContext<'_>, root: NodeId) -> RuleResult {
        if !ctx.config.check_contrast {
            return Ok(Vec::new());
        }

        let mut violations = Vec::new();
        for node in ctx.query_all("*", root)? {
            if ctx.tree.own_text(node).trim().is_empty() {
                continue;
            }
            match self.evaluate(ctx, node) {
                Ok(Some(violation)) => violations.push(violation),
                Ok(None) => {}
                Err(StyleError::Unreachable(at)) => {
                    tracing::warn!("Skipping contrast check of {}: style of {} is unreachable", node, at);
                }
                Err(err) => return Err(RuleError::Style(err)),
            }
        }
        Ok(violations)
    }
}
