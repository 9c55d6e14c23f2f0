//! fOS CSS - Style Access
//!
//! Read-only view of resolved styles: the `Color` value type, computed
//! style records, and the `StyleSource` capability that produces them.
//! `InlineStyleSource` resolves `style` attributes with inheritance.

mod color;
pub mod computed;
mod inline;

pub use color::{resolve_css_color, Color};
pub use computed::ComputedStyle;
pub use inline::InlineStyleSource;

use fos_dom::{DomTree, NodeId};

/// Style resolution capability
///
/// Implemented by whatever owns the cascade. Consumers only read from it.
pub trait StyleSource {
    /// Resolved style of an element
    fn computed_style(&self, tree: &DomTree, node: NodeId) -> Result<ComputedStyle, StyleError>;

    /// Resolve an arbitrary CSS color expression
    fn resolve_color(&self, expr: &str) -> Option<Color> {
        resolve_css_color(expr)
    }
}

impl<S: StyleSource + ?Sized> StyleSource for &S {
    fn computed_style(&self, tree: &DomTree, node: NodeId) -> Result<ComputedStyle, StyleError> {
        (**self).computed_style(tree, node)
    }

    fn resolve_color(&self, expr: &str) -> Option<Color> {
        (**self).resolve_color(expr)
    }
}

/// Style errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// Access across a restricted boundary (e.g. a cross-origin frame)
    #[error("Style of {0} is not reachable")]
    Unreachable(NodeId),

    #[error("{0} has no computed style")]
    NotStyled(NodeId),
}
