//! Images without a text alternative

use fos_dom::NodeId;

use crate::rule::{AccessibilityError, AuditContext, Rule, RuleResult};

const URL: &str = "https://www.w3.org/WAI/WCAG21/Understanding/non-text-content.html";

/// Flags `<img>` elements with no text alternative
///
/// `alt=""` and `role="presentation"`/`role="none"` mark an image as
/// decorative and satisfy the check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageAltRule;

impl ImageAltRule {
    fn has_text_alternative(ctx: &AuditContext<'_>, img: NodeId) -> bool {
        let attr = |name| ctx.tree.attribute(img, name);
        let non_empty = |name| attr(name).is_some_and(|v: &str| !v.trim().is_empty());

        attr("alt").is_some()
            || attr("role").is_some_and(|role| {
                role.split_ascii_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("presentation") || r.eq_ignore_ascii_case("none"))
            })
            || non_empty("aria-label")
            || non_empty("aria-labelledby")
            || non_empty("title")
    }
}

impl Rule for ImageAltRule {
    fn name(&self) -> &str {
        "image-alt"
    }

    fn check(&self, ctx: &AuditContext<'_>, root: NodeId) -> RuleResult {
        Ok(ctx
            .query_all("img", root)?
            .into_iter()
            .filter(|&img| !Self::has_text_alternative(ctx, img))
            .map(|img| {
                AccessibilityError::new(
                    "Image has no text alternative; add an alt attribute (alt=\"\" if it is decorative)",
                    URL,
                    img,
                )
            })
            .collect())
    }
}
