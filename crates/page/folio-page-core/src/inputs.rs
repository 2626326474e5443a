//! Input contracts for the page engine.
//!
//! Adapters collect host notifications between ticks and pass them into
//! Engine::update(): one visibility batch plus surface lifecycle flags.

use serde::{Deserialize, Serialize};

use crate::ids::TargetId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// One batch of visibility-monitor notifications.
    #[serde(default)]
    pub visibility: Vec<VisibilityEntry>,
    /// `Some(false)` once the host noticed the cycle display surface is gone.
    #[serde(default)]
    pub text_surface_attached: Option<bool>,
}

impl Inputs {
    pub fn visibility(entries: Vec<VisibilityEntry>) -> Self {
        Self {
            visibility: entries,
            ..Self::default()
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibilityEntry {
    pub target: TargetId,
    pub is_intersecting: bool,
    #[serde(default)]
    pub ratio: f64,
}

impl VisibilityEntry {
    pub fn intersecting(target: TargetId, ratio: f64) -> Self {
        Self {
            target,
            is_intersecting: true,
            ratio,
        }
    }

    pub fn leaving(target: TargetId) -> Self {
        Self {
            target,
            is_intersecting: false,
            ratio: 0.0,
        }
    }
}
