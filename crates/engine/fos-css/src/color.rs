//! Color values
//!
//! 8-bit RGB channels with a floating alpha, the representation contrast
//! math works on. Named colors and other CSS color syntaxes are resolved
//! with `csscolorparser`.

use serde::{Deserialize, Serialize};

/// RGBA color (alpha in 0.0..=1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 1.0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 1.0 };
    /// `transparent` is white at zero alpha
    pub const TRANSPARENT: Color = Color { r: 255, g: 255, b: 255, a: 0.0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Alpha is clamped to 0.0..=1.0
    pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a: a.clamp(0.0, 1.0) }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// Resolve any CSS color string (`red`, `#0f0a`, `hwb(...)`, ...)
pub fn resolve_css_color(input: &str) -> Option<Color> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let parsed: csscolorparser::Color = input.parse().ok()?;
    let [r, g, b, _] = parsed.to_rgba8();
    Some(Color::rgba(r, g, b, parsed.a as f64))
}
