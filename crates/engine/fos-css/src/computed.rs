//! Computed Styles
//!
//! Resolved property values for an element, kept as CSS strings the way a
//! style resolver hands them out. Numeric helpers parse on demand.

use serde::{Deserialize, Serialize};

/// Properties that inherit from the parent element by default
pub const INHERITED_PROPERTIES: &[&str] = &["color", "font-size", "font-weight", "font-style", "visibility"];

/// Computed style for an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComputedStyle {
    pub color: String,
    pub background_color: String,
    pub background_image: String,
    pub font_size: String,
    pub font_weight: String,
    pub font_style: String,
    pub display: String,
    pub visibility: String,
    pub opacity: String,
    pub overflow_x: String,
    pub overflow_y: String,
    pub text_decoration: String,
}

impl Default for ComputedStyle {
    /// Initial values
    fn default() -> Self {
        Self {
            color: "rgb(0, 0, 0)".into(),
            background_color: "rgba(0, 0, 0, 0)".into(),
            background_image: "none".into(),
            font_size: "16px".into(),
            font_weight: "400".into(),
            font_style: "normal".into(),
            display: "inline".into(),
            visibility: "visible".into(),
            opacity: "1".into(),
            overflow_x: "visible".into(),
            overflow_y: "visible".into(),
            text_decoration: "none".into(),
        }
    }
}

impl ComputedStyle {
    /// Style of a child element before its own declarations apply:
    /// inherited properties copied, everything else initial
    pub fn inherit(&self) -> Self {
        Self {
            color: self.color.clone(),
            font_size: self.font_size.clone(),
            font_weight: self.font_weight.clone(),
            font_style: self.font_style.clone(),
            visibility: self.visibility.clone(),
            ..Self::default()
        }
    }

    fn slot(&mut self, property: &str) -> Option<&mut String> {
        Some(match property {
            "color" => &mut self.color,
            "background-color" => &mut self.background_color,
            "background-image" => &mut self.background_image,
            "font-size" => &mut self.font_size,
            "font-weight" => &mut self.font_weight,
            "font-style" => &mut self.font_style,
            "display" => &mut self.display,
            "visibility" => &mut self.visibility,
            "opacity" => &mut self.opacity,
            "overflow-x" => &mut self.overflow_x,
            "overflow-y" => &mut self.overflow_y,
            "text-decoration" => &mut self.text_decoration,
            _ => return None,
        })
    }

    /// Read a longhand by its CSS name
    pub fn get(&self, property: &str) -> Option<&str> {
        Some(match property {
            "color" => &self.color,
            "background-color" => &self.background_color,
            "background-image" => &self.background_image,
            "font-size" => &self.font_size,
            "font-weight" => &self.font_weight,
            "font-style" => &self.font_style,
            "display" => &self.display,
            "visibility" => &self.visibility,
            "opacity" => &self.opacity,
            "overflow-x" => &self.overflow_x,
            "overflow-y" => &self.overflow_y,
            "text-decoration" => &self.text_decoration,
            _ => return None,
        })
    }

    /// Set a longhand by its CSS name; returns false for unknown properties
    pub fn set(&mut self, property: &str, value: impl Into<String>) -> bool {
        match self.slot(property) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Font size in pixels, if it is a plain px or unitless number
    pub fn font_size_px(&self) -> Option<f64> {
        let value = self.font_size.trim();
        value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
    }

    /// Numeric font weight, mapping `normal` and `bold`
    pub fn font_weight_value(&self) -> Option<u16> {
        match self.font_weight.trim() {
            "normal" => Some(400),
            "bold" => Some(700),
            other => other.parse().ok(),
        }
    }

    pub fn opacity_value(&self) -> f64 {
        self.opacity.trim().parse().unwrap_or(1.0)
    }

    /// Not rendered or not visible
    pub fn is_hidden(&self) -> bool {
        self.display == "none"
            || matches!(self.visibility.as_str(), "hidden" | "collapse")
            || self.opacity_value() <= 0.0
    }

    /// Hidden together with every descendant, whatever they set
    ///
    /// `visibility` is left out: a descendant can turn it back on.
    pub fn hides_subtree(&self) -> bool {
        self.display == "none" || self.opacity_value() <= 0.0
    }

    pub fn has_background_image(&self) -> bool {
        let image = self.background_image.trim();
        !image.is_empty() && image != "none"
    }
}
