//! Color Contrast
//!
//! WCAG 2.x relative luminance and contrast ratio, plus the color handling
//! needed to get there from computed styles: parsing, alpha compositing and
//! resolving the background actually painted behind a node.

use fos_css::{Color, ComputedStyle, StyleError, StyleSource};
use fos_dom::{DomTree, NodeId};

use crate::config::WcagLevel;

/// Font size (px) from which any text counts as large (18pt)
pub const LARGE_TEXT_PX: f64 = 24.0;
/// Font size (px) from which bold text counts as large (14pt)
pub const LARGE_BOLD_TEXT_PX: f64 = 18.66;

/// Contrast checker
#[derive(Debug)]
pub struct ContrastChecker;

impl ContrastChecker {
    /// Parse a color expression
    ///
    /// Hex, `rgb[a]()`, `hsl[a]()` and `transparent` are handled here.
    /// Anything else goes to the style source's resolver. `None` means the
    /// color cannot be evaluated.
    pub fn parse(expr: &str, styles: &dyn StyleSource) -> Option<Color> {
        Self::parse_literal(expr).or_else(|| styles.resolve_color(expr))
    }

    /// Parse the color syntaxes this module understands natively
    pub fn parse_literal(expr: &str) -> Option<Color> {
        let expr = expr.trim();
        let lower = expr.to_ascii_lowercase();

        if lower == "transparent" {
            return Some(Color::TRANSPARENT);
        }
        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex);
        }

        let (name, args) = lower.strip_suffix(')')?.split_once('(')?;
        let args: Vec<&str> = args
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|a| !a.is_empty())
            .collect();
        if !(3..=4).contains(&args.len()) {
            return None;
        }
        let alpha = match args.get(3) {
            Some(a) => parse_alpha(a)?,
            None => 1.0,
        };

        match name.trim() {
            "rgb" | "rgba" => Some(Color::rgba(
                parse_channel(args[0])?,
                parse_channel(args[1])?,
                parse_channel(args[2])?,
                alpha,
            )),
            "hsl" | "hsla" => {
                let hue = parse_hue(args[0])?;
                let saturation = parse_percent(args[1])?;
                let lightness = parse_percent(args[2])?;
                let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
                Some(Color::rgba(r, g, b, alpha))
            }
            _ => None,
        }
    }

    /// Source-over composite of `fg` on `bg`; the result is always opaque
    pub fn composite(fg: Color, bg: Color) -> Color {
        if fg.is_opaque() {
            return fg;
        }
        let blend = |f: u8, b: u8| -> u8 {
            let value = f64::from(f) * fg.a + f64::from(b) * bg.a * (1.0 - fg.a);
            value.round().clamp(0.0, 255.0) as u8
        };
        Color::rgb(blend(fg.r, bg.r), blend(fg.g, bg.g), blend(fg.b, bg.b))
    }

    /// Calculate relative luminance
    pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.03928 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        }
        0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
    }

    /// Relative luminance of a color, ignoring alpha
    pub fn relative_luminance(color: Color) -> f64 {
        Self::luminance(color.r, color.g, color.b)
    }

    /// Calculate contrast ratio between two colors (1.0 to 21.0)
    pub fn contrast_ratio(a: Color, b: Color) -> f64 {
        let l1 = Self::relative_luminance(a);
        let l2 = Self::relative_luminance(b);
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Opaque color painted behind `node`
    ///
    /// Walks the composed ancestor chain starting at `node` itself until a
    /// fully opaque background is found (white if none is), then
    /// composites every translucent layer met on the way back down.
    /// Unresolvable backgrounds count as transparent.
    pub fn effective_background(
        tree: &DomTree,
        styles: &dyn StyleSource,
        node: NodeId,
    ) -> Result<Color, StyleError> {
        let mut layers = Vec::new();
        let mut base = Color::WHITE;

        let mut current = Some(node);
        while let Some(id) = current {
            if tree.is_element(id) {
                let style = styles.computed_style(tree, id)?;
                match Self::parse(&style.background_color, styles) {
                    Some(color) if color.is_opaque() => {
                        base = color;
                        break;
                    }
                    Some(color) if !color.is_transparent() => layers.push(color),
                    Some(_) => {}
                    None => tracing::warn!(
                        "Unresolvable background color `{}` on {}",
                        style.background_color,
                        id
                    ),
                }
            }
            current = tree.composed_parent(id);
        }

        Ok(layers.into_iter().rev().fold(base, |below, layer| Self::composite(layer, below)))
    }

    /// 18pt and up, or 14pt and up when bold
    pub fn is_large_text(style: &ComputedStyle) -> bool {
        let Some(size) = style.font_size_px() else {
            return false;
        };
        let bold = matches!(style.font_weight.trim(), "bold" | "bolder")
            || style.font_weight_value().is_some_and(|w| w >= 700);
        size >= LARGE_TEXT_PX || (size >= LARGE_BOLD_TEXT_PX && bold)
    }

    /// `rgb(r,g,b)` when opaque, `rgba(r,g,b,a)` otherwise
    pub fn format(color: Color) -> String {
        if color.is_opaque() {
            format!("rgb({},{},{})", color.r, color.g, color.b)
        } else {
            format!("rgba({},{},{},{:.2})", color.r, color.g, color.b, color.a)
        }
    }

    /// Minimum ratio for the given text size and level
    pub fn required_ratio(large_text: bool, level: WcagLevel) -> f64 {
        match (level, large_text) {
            (WcagLevel::Aa, false) => 4.5,
            (WcagLevel::Aa, true) => 3.0,
            (WcagLevel::Aaa, false) => 7.0,
            (WcagLevel::Aaa, true) => 4.5,
        }
    }

    /// A ratio strictly below the requirement is a violation
    pub fn fails(ratio: f64, large_text: bool, level: WcagLevel) -> bool {
        ratio < Self::required_ratio(large_text, level)
    }

    /// Check if contrast meets WCAG AA (4.5:1 for normal text)
    pub fn meets_aa(ratio: f64, large_text: bool) -> bool {
        ratio >= Self::required_ratio(large_text, WcagLevel::Aa)
    }

    /// Check if contrast meets WCAG AAA (7:1 for normal text)
    pub fn meets_aaa(ratio: f64, large_text: bool) -> bool {
        ratio >= Self::required_ratio(large_text, WcagLevel::Aaa)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}

fn parse_number(value: &str) -> Option<f64> {
    let n: f64 = value.parse().ok()?;
    n.is_finite().then_some(n)
}

/// 0..=255 or a percentage
fn parse_channel(value: &str) -> Option<u8> {
    let n = match value.strip_suffix('%') {
        Some(pct) => parse_number(pct)? * 2.55,
        None => parse_number(value)?,
    };
    Some(n.round().clamp(0.0, 255.0) as u8)
}

/// 0..=1 or a percentage
fn parse_alpha(value: &str) -> Option<f64> {
    let a = match value.strip_suffix('%') {
        Some(pct) => parse_number(pct)? / 100.0,
        None => parse_number(value)?,
    };
    Some(a.clamp(0.0, 1.0))
}

/// Percentage as a 0..=1 fraction
fn parse_percent(value: &str) -> Option<f64> {
    let n = parse_number(value.strip_suffix('%').unwrap_or(value))?;
    Some((n / 100.0).clamp(0.0, 1.0))
}

/// Hue in degrees
fn parse_hue(value: &str) -> Option<f64> {
    if let Some(turns) = value.strip_suffix("turn") {
        return Some(parse_number(turns)? * 360.0);
    }
    if let Some(rad) = value.strip_suffix("rad") {
        return Some(parse_number(rad)?.to_degrees());
    }
    parse_number(value.strip_suffix("deg").unwrap_or(value))
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let to_u8 = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    if saturation == 0.0 {
        let grey = to_u8(lightness);
        return (grey, grey, grey);
    }

    let h = hue.rem_euclid(360.0) / 360.0;
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    (to_u8(channel(h + 1.0 / 3.0)), to_u8(channel(h)), to_u8(channel(h - 1.0 / 3.0)))
}
