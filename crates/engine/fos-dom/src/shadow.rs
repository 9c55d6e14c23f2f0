//! Shadow DOM
//!
//! Shadow roots attached to host elements. An open root is traversable by
//! shadow-piercing queries; a closed root is not, and nothing in this crate
//! hands out a closed root to callers other than the one that attached it.

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

/// Shadow root initialization options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowRootInit {
    pub mode: ShadowRootMode,
    pub delegates_focus: bool,
}

impl ShadowRootInit {
    pub fn open() -> Self {
        Self { mode: ShadowRootMode::Open, ..Default::default() }
    }

    pub fn closed() -> Self {
        Self { mode: ShadowRootMode::Closed, ..Default::default() }
    }
}

/// Shadow root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRoot {
    /// Host element
    pub host: NodeId,
    /// Mode (open/closed)
    pub mode: ShadowRootMode,
    /// Whether focus is delegated to the first focusable element
    pub delegates_focus: bool,
}

impl ShadowRoot {
    /// Create a new shadow root
    pub fn new(host: NodeId, mode: ShadowRootMode) -> Self {
        Self {
            host,
            mode,
            delegates_focus: false,
        }
    }

    /// Create from init options
    pub fn from_init(host: NodeId, init: ShadowRootInit) -> Self {
        Self {
            host,
            mode: init.mode,
            delegates_focus: init.delegates_focus,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.mode == ShadowRootMode::Open
    }
}
