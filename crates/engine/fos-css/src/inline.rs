//! Inline style resolver
//!
//! Computes styles from `style="..."` attributes plus a small user-agent
//! default for `display`. Inherited properties flow down the composed tree,
//! so text inside a shadow root inherits from its host.

use std::collections::HashSet;

use fos_dom::{DomTree, NodeId};

use crate::computed::INHERITED_PROPERTIES;
use crate::{ComputedStyle, StyleError, StyleSource};

const BLOCK_ELEMENTS: &[&str] = &[
    "html", "body", "div", "p", "section", "article", "main", "nav", "header", "footer", "aside",
    "ul", "ol", "li", "form", "fieldset", "h1", "h2", "h3", "h4", "h5", "h6", "figure", "table",
];

const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "template", "title", "meta", "link"];

/// Base font size for `rem` and keyword sizes
const MEDIUM_PX: f64 = 16.0;

/// Resolves computed styles from inline `style` attributes
#[derive(Debug, Clone, Default)]
pub struct InlineStyleSource {
    unreachable: HashSet<NodeId>,
}

impl InlineStyleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a subtree as off-limits, like a cross-origin frame:
    /// styling it or anything below it fails with `StyleError::Unreachable`
    pub fn mark_unreachable(&mut self, node: NodeId) {
        self.unreachable.insert(node);
    }

    fn is_unreachable(&self, tree: &DomTree, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.unreachable.contains(&id) {
                return true;
            }
            current = tree.composed_parent(id);
        }
        false
    }
}

impl StyleSource for InlineStyleSource {
    fn computed_style(&self, tree: &DomTree, node: NodeId) -> Result<ComputedStyle, StyleError> {
        if self.is_unreachable(tree, node) {
            return Err(StyleError::Unreachable(node));
        }
        if !tree.is_element(node) {
            return Err(StyleError::NotStyled(node));
        }

        let mut chain = vec![node];
        let mut current = tree.composed_parent_element(node);
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = tree.composed_parent_element(ancestor);
        }

        let mut style = ComputedStyle::default();
        for &element in chain.iter().rev() {
            let parent = style;
            style = parent.inherit();
            if let Some(tag) = tree.tag_name(element) {
                if BLOCK_ELEMENTS.contains(&tag) {
                    style.display = "block".into();
                } else if HIDDEN_ELEMENTS.contains(&tag) {
                    style.display = "none".into();
                }
            }
            if let Some(declarations) = tree.attribute(element, "style") {
                apply_declarations(&mut style, &parent, declarations);
            }
        }

        tracing::trace!("Computed inline style for {}", node);
        Ok(style)
    }
}

/// Apply a declaration block on top of `style`
pub fn apply_declarations(style: &mut ComputedStyle, parent: &ComputedStyle, block: &str) {
    for declaration in block.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = strip_important(value.trim());
        if value.is_empty() {
            continue;
        }
        apply_declaration(style, parent, &property, value);
    }
}

fn strip_important(value: &str) -> &str {
    match value.rfind('!') {
        Some(pos) if value[pos + 1..].trim().eq_ignore_ascii_case("important") => value[..pos].trim_end(),
        _ => value,
    }
}

fn apply_declaration(style: &mut ComputedStyle, parent: &ComputedStyle, property: &str, value: &str) {
    match value.to_ascii_lowercase().as_str() {
        "inherit" => {
            if let Some(inherited) = parent.get(property) {
                style.set(property, inherited);
            } else if property == "overflow" {
                style.overflow_x = parent.overflow_x.clone();
                style.overflow_y = parent.overflow_y.clone();
            }
            return;
        }
        "initial" | "unset" => {
            let initial = ComputedStyle::default();
            let keep_inherited = value.eq_ignore_ascii_case("unset") && INHERITED_PROPERTIES.contains(&property);
            let source = if keep_inherited { parent } else { &initial };
            if let Some(reset) = source.get(property) {
                style.set(property, reset);
            }
            return;
        }
        _ => {}
    }

    match property {
        "background" => {
            let lower = value.to_ascii_lowercase();
            if lower.contains("url(") || lower.contains("gradient(") {
                style.background_image = value.to_string();
            } else {
                style.background_color = value.to_string();
                style.background_image = "none".into();
            }
        }
        "overflow" => {
            let mut parts = value.split_whitespace();
            let x = parts.next().unwrap_or(value);
            let y = parts.next().unwrap_or(x);
            style.overflow_x = x.to_string();
            style.overflow_y = y.to_string();
        }
        "font-size" => {
            let parent_px = parent.font_size_px().unwrap_or(MEDIUM_PX);
            match resolve_font_size(value, parent_px) {
                Some(px) => style.font_size = format!("{}px", px),
                None => tracing::debug!("Ignoring font-size `{}`", value),
            }
        }
        "font-weight" => {
            let parent_weight = parent.font_weight_value().unwrap_or(400);
            style.font_weight = resolve_font_weight(value, parent_weight);
        }
        _ => {
            if !style.set(property, value) {
                tracing::trace!("Ignoring unsupported property `{}`", property);
            }
        }
    }
}

/// Absolute pixel size for a `font-size` value
fn resolve_font_size(value: &str, parent_px: f64) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let keyword = match value.as_str() {
        "xx-small" => Some(MEDIUM_PX * 3.0 / 5.0),
        "x-small" => Some(MEDIUM_PX * 3.0 / 4.0),
        "small" => Some(MEDIUM_PX * 8.0 / 9.0),
        "medium" => Some(MEDIUM_PX),
        "large" => Some(MEDIUM_PX * 6.0 / 5.0),
        "x-large" => Some(MEDIUM_PX * 3.0 / 2.0),
        "xx-large" => Some(MEDIUM_PX * 2.0),
        "larger" => Some(parent_px * 1.2),
        "smaller" => Some(parent_px / 1.2),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }

    let number = |suffix: &str| -> Option<f64> { value.strip_suffix(suffix)?.trim().parse().ok() };
    let px = if let Some(n) = number("rem") {
        n * MEDIUM_PX
    } else if let Some(n) = number("em") {
        n * parent_px
    } else if let Some(n) = number("%") {
        n * parent_px / 100.0
    } else if let Some(n) = number("px") {
        n
    } else if let Some(n) = number("pt") {
        n * 4.0 / 3.0
    } else {
        return None;
    };
    (px.is_finite() && px >= 0.0).then_some(px)
}

/// Computed `font-weight`, always numeric
fn resolve_font_weight(value: &str, parent: u16) -> String {
    let weight = match value.trim().to_ascii_lowercase().as_str() {
        "normal" => 400,
        "bold" => 700,
        "bolder" => match parent {
            0..400 => 400,
            400..600 => 700,
            _ => 900,
        },
        "lighter" => match parent {
            0..600 => 100,
            600..800 => 400,
            _ => 700,
        },
        other => match other.parse::<u16>() {
            Ok(n) if (1..=1000).contains(&n) => n,
            _ => parent,
        },
    };
    weight.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::ShadowRootInit;

    #[test]
    fn test_declarations() {
        let parent = ComputedStyle::default();
        let mut style = parent.inherit();
        apply_declarations(
            &mut style,
            &parent,
            "color: #333 !important; BACKGROUND: rgba(0,0,0,.5); overflow: hidden auto; bogus; margin: 0",
        );

        assert_eq!(style.color, "#333");
        assert_eq!(style.background_color, "rgba(0,0,0,.5)");
        assert_eq!(style.overflow_x, "hidden");
        assert_eq!(style.overflow_y, "auto");
    }

    #[test]
    fn test_background_image_shorthand() {
        let parent = ComputedStyle::default();
        let mut style = parent.inherit();
        apply_declarations(&mut style, &parent, "background: linear-gradient(red, blue)");
        assert!(style.has_background_image());
        assert_eq!(style.background_color, "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn test_font_size_units() {
        assert_eq!(resolve_font_size("2em", 10.0), Some(20.0));
        assert_eq!(resolve_font_size("150%", 16.0), Some(24.0));
        assert_eq!(resolve_font_size("1.5rem", 10.0), Some(24.0));
        assert_eq!(resolve_font_size("18pt", 16.0), Some(24.0));
        assert_eq!(resolve_font_size("x-large", 10.0), Some(24.0));
        assert_eq!(resolve_font_size("big", 16.0), None);
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(resolve_font_weight("bold", 400), "700");
        assert_eq!(resolve_font_weight("bolder", 400), "700");
        assert_eq!(resolve_font_weight("bolder", 700), "900");
        assert_eq!(resolve_font_weight("lighter", 400), "100");
        assert_eq!(resolve_font_weight("heavy", 500), "500");
    }

    #[test]
    fn test_inheritance_crosses_shadow_boundary() {
        let mut tree = DomTree::new();
        let host = tree.append_element(tree.root(), "x-card").unwrap();
        tree.set_attribute(host, "style", "color: navy; font-size: 20px; background: white").unwrap();
        let shadow = tree.attach_shadow(host, ShadowRootInit::closed()).unwrap();
        let label = tree.append_element(shadow, "span").unwrap();
        tree.set_attribute(label, "style", "font-size: 1.5em").unwrap();

        let style = InlineStyleSource::new().computed_style(&tree, label).unwrap();
        assert_eq!(style.color, "navy");
        assert_eq!(style.font_size_px(), Some(30.0));
        assert_eq!(style.background_color, "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn test_unreachable_and_unstyled() {
        let mut tree = DomTree::new();
        let frame = tree.append_element(tree.root(), "iframe").unwrap();
        let inner = tree.append_element(frame, "p").unwrap();
        let text = tree.append_text(tree.root(), "loose").unwrap();

        let mut styles = InlineStyleSource::new();
        styles.mark_unreachable(frame);

        assert_eq!(styles.computed_style(&tree, inner), Err(StyleError::Unreachable(inner)));
        assert_eq!(styles.computed_style(&tree, text), Err(StyleError::NotStyled(text)));
    }

    #[test]
    fn test_user_agent_display() {
        let mut tree = DomTree::new();
        let div = tree.append_element(tree.root(), "div").unwrap();
        let script = tree.append_element(div, "script").unwrap();
        let styles = InlineStyleSource::new();

        assert_eq!(styles.computed_style(&tree, div).unwrap().display, "block");
        assert!(styles.computed_style(&tree, script).unwrap().is_hidden());
    }
}
