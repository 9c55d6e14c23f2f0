//! Edge case tests for fos-a11y
//!
//! Contrast math boundaries, color parsing corner cases and odd trees.

use fos_a11y::{AuditConfig, AuditContext, Auditor, ContrastChecker, ContrastRule, Rule, WcagLevel};
use fos_css::{Color, ComputedStyle, InlineStyleSource, StyleError, StyleSource};
use fos_dom::{DomTree, NodeId, ShadowRootInit};

/// A spread of colors across the cube, including translucent ones
fn palette() -> Vec<Color> {
    let mut colors = Vec::new();
    for r in (0..=255u16).step_by(51) {
        for g in (0..=255u16).step_by(85) {
            for b in [0u8, 128, 255] {
                colors.push(Color::rgb(r as u8, g as u8, b));
            }
        }
    }
    colors.push(Color::rgba(10, 200, 30, 0.4));
    colors.push(Color::TRANSPARENT);
    colors
}

// ============================================================================
// CONTRAST MATH
// ============================================================================

#[test]
fn test_contrast_is_symmetric() {
    let colors = palette();
    for &a in &colors {
        for &b in &colors {
            assert_eq!(ContrastChecker::contrast_ratio(a, b), ContrastChecker::contrast_ratio(b, a));
        }
    }
}

#[test]
fn test_contrast_with_self_is_one() {
    for c in palette() {
        assert!((ContrastChecker::contrast_ratio(c, c) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_contrast_bounds() {
    for a in palette() {
        for b in palette() {
            let ratio = ContrastChecker::contrast_ratio(a, b);
            assert!((1.0..=21.0 + 1e-9).contains(&ratio), "{}", ratio);
        }
    }
}

#[test]
fn test_composite_opaque_is_identity() {
    let colors = palette();
    for &fg in colors.iter().filter(|c| c.is_opaque()) {
        for &bg in &colors {
            assert_eq!(ContrastChecker::composite(fg, bg), fg);
        }
    }
}

#[test]
fn test_composite_always_opaque() {
    for fg in palette() {
        for bg in palette() {
            assert!(ContrastChecker::composite(fg, bg).is_opaque());
        }
    }
}

#[test]
fn test_threshold_is_strict() {
    assert!(!ContrastChecker::fails(4.5, false, WcagLevel::Aa));
    assert!(ContrastChecker::fails(4.499, false, WcagLevel::Aa));
    assert!(!ContrastChecker::fails(3.0, true, WcagLevel::Aa));
    assert!(ContrastChecker::fails(2.999, true, WcagLevel::Aa));
    assert!(!ContrastChecker::fails(7.0, false, WcagLevel::Aaa));
    assert!(ContrastChecker::fails(6.999, false, WcagLevel::Aaa));
}

#[test]
fn test_half_grey_over_white() {
    let styles = InlineStyleSource::new();
    let fg = ContrastChecker::parse("rgba(100,100,100,0.5)", &styles).unwrap();
    let out = ContrastChecker::composite(fg, Color::WHITE);
    for channel in [out.r, out.g, out.b] {
        assert!((177..=178).contains(&channel), "{}", channel);
    }
    assert_eq!(out.a, 1.0);
}

#[test]
fn test_luminance_threshold_neighbours() {
    // 10/255 still falls in the linear segment, 11/255 does not
    let linear = ContrastChecker::luminance(10, 10, 10);
    let curved = ContrastChecker::luminance(11, 11, 11);
    assert!(curved > linear);
    assert!((linear - (10.0 / 255.0) / 12.92).abs() < 1e-12);
}

// ============================================================================
// COLOR PARSING
// ============================================================================

#[test]
fn test_parse_corner_cases() {
    let styles = InlineStyleSource::new();
    let parse = |s: &str| ContrastChecker::parse(s, &styles);

    assert_eq!(parse("  #ABC  "), Some(Color::rgb(0xaa, 0xbb, 0xcc)));
    assert_eq!(parse("TRANSPARENT"), Some(Color::TRANSPARENT));
    assert_eq!(parse("rgba(0, 0, 0, 2)").map(|c| c.a), Some(1.0));
    assert_eq!(parse("rgb(0 0 0 / 0)"), Some(Color::rgba(0, 0, 0, 0.0)));
    assert_eq!(parse("hsl(-120, 100%, 50%)"), Some(Color::rgb(0, 0, 255)));
    // 8-digit hex is left to the resolver
    assert_eq!(ContrastChecker::parse_literal("#00000080"), None);
    assert_eq!(parse("#00000080").map(|c| (c.r, c.g, c.b)), Some((0, 0, 0)));
    assert_eq!(parse("rgb(a, b, c)"), None);
    assert_eq!(parse("rgb(1, 2, 3, 4, 5)"), None);
    assert_eq!(parse(""), None);
}

/// Resolver that only knows one custom keyword
struct BrandColors;

impl StyleSource for BrandColors {
    fn computed_style(&self, tree: &DomTree, node: NodeId) -> Result<ComputedStyle, StyleError> {
        InlineStyleSource::new().computed_style(tree, node)
    }

    fn resolve_color(&self, expr: &str) -> Option<Color> {
        (expr.trim() == "brand").then_some(Color::rgb(250, 250, 250))
    }
}

#[test]
fn test_parse_delegates_to_style_source() {
    assert_eq!(ContrastChecker::parse("brand", &BrandColors), Some(Color::rgb(250, 250, 250)));
    assert_eq!(ContrastChecker::parse("red", &BrandColors), None);

    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p").unwrap();
    tree.set_attribute(p, "style", "color: brand").unwrap();
    tree.append_text(p, "almost invisible").unwrap();

    let config = AuditConfig::default();
    let ctx = AuditContext::new(&tree, &BrandColors, &config);
    assert_eq!(ContrastRule.check(&ctx, tree.root()).unwrap().len(), 1);
}

// ============================================================================
// TREES
// ============================================================================

#[test]
fn test_background_from_shadow_host_chain() {
    let mut tree = DomTree::new();
    let outer = tree.append_element(tree.root(), "x-outer").unwrap();
    tree.set_attribute(outer, "style", "background-color: rgb(0, 0, 255)").unwrap();
    let outer_root = tree.attach_shadow(outer, ShadowRootInit::open()).unwrap();
    let inner = tree.append_element(outer_root, "x-inner").unwrap();
    let inner_root = tree.attach_shadow(inner, ShadowRootInit::closed()).unwrap();
    let span = tree.append_element(inner_root, "span").unwrap();

    let styles = InlineStyleSource::new();
    let bg = ContrastChecker::effective_background(&tree, &styles, span).unwrap();
    assert_eq!(bg, Color::rgb(0, 0, 255));
}

#[test]
fn test_no_backgrounds_defaults_to_white() {
    let mut tree = DomTree::new();
    let div = tree.append_element(tree.root(), "div").unwrap();
    tree.set_attribute(div, "style", "background-color: transparent").unwrap();
    let styles = InlineStyleSource::new();
    assert_eq!(ContrastChecker::effective_background(&tree, &styles, div).unwrap(), Color::WHITE);
}

#[test]
fn test_unreachable_background_is_an_error() {
    let mut tree = DomTree::new();
    let frame = tree.append_element(tree.root(), "iframe").unwrap();
    let p = tree.append_element(frame, "p").unwrap();
    let mut styles = InlineStyleSource::new();
    styles.mark_unreachable(frame);

    assert_eq!(
        ContrastChecker::effective_background(&tree, &styles, p),
        Err(StyleError::Unreachable(p))
    );
}

#[test]
fn test_whitespace_only_text_is_ignored() {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p").unwrap();
    tree.set_attribute(p, "style", "color: white").unwrap();
    tree.append_text(p, " \n\t ").unwrap();

    let report = Auditor::default().scan(&tree, &InlineStyleSource::new(), None).unwrap();
    assert!(report.is_clean());
}

#[test]
fn test_deeply_nested_text_inherits_color() {
    let mut tree = DomTree::new();
    let mut node = tree.append_element(tree.root(), "div").unwrap();
    tree.set_attribute(node, "style", "color: #ccc").unwrap();
    for _ in 0..100 {
        node = tree.append_element(node, "div").unwrap();
    }
    tree.append_text(node, "deep").unwrap();

    let report = Auditor::default().scan(&tree, &InlineStyleSource::new(), None).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].element(), Some(node));
}
