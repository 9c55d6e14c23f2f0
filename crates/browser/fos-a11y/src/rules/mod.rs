//! Built-in rules

mod contrast;
mod image_alt;

pub use contrast::ContrastRule;
pub use image_alt::ImageAltRule;

use crate::rule::Rule;

/// The built-in rule set, in run order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(ImageAltRule), Box::new(ContrastRule)]
}
