//! Reveal scheduler: one-shot, monotonic "visible" transitions.
//!
//! Two triggers share the same effect. Scroll targets are watched by the host
//! visibility monitor and revealed on their first intersecting notification;
//! load-stage targets are revealed on timers (see `load_stage`). Marking a
//! target revealed and stopping the watch are separate actions so a
//! double-fired notification is a no-op for both.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ObserverConfig;
use crate::error::PageError;
use crate::ids::TargetId;
use crate::inputs::VisibilityEntry;
use crate::outputs::{Change, Outputs};

/// Options handed to the host visibility monitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    pub threshold: f64,
    /// CSS margin string (`top right bottom left`).
    pub root_margin: String,
}

impl From<&ObserverConfig> for ObserverOptions {
    fn from(cfg: &ObserverConfig) -> Self {
        Self {
            threshold: cfg.threshold,
            root_margin: format!("0px 0px {}px 0px", cfg.root_margin_bottom_px),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealTarget {
    pub id: TargetId,
    pub revealed: bool,
    /// Still registered with the visibility monitor.
    pub observed: bool,
}

#[derive(Debug, Default)]
pub struct RevealScheduler {
    targets: HashMap<TargetId, RevealTarget>,
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a target that is not watched for visibility.
    pub fn insert(&mut self, id: TargetId) {
        self.targets.entry(id).or_insert(RevealTarget {
            id,
            revealed: false,
            observed: false,
        });
    }

    /// Track a target and mark it as watched by the visibility monitor.
    pub fn observe(&mut self, id: TargetId) {
        let target = self.targets.entry(id).or_insert(RevealTarget {
            id,
            revealed: false,
            observed: false,
        });
        if !target.revealed {
            target.observed = true;
        }
    }

    pub fn get(&self, id: TargetId) -> Option<&RevealTarget> {
        self.targets.get(&id)
    }

    pub fn is_revealed(&self, id: TargetId) -> bool {
        self.targets.get(&id).is_some_and(|t| t.revealed)
    }

    pub fn is_observed(&self, id: TargetId) -> bool {
        self.targets.get(&id).is_some_and(|t| t.observed)
    }

    pub fn observed_count(&self) -> usize {
        self.targets.values().filter(|t| t.observed).count()
    }

    pub fn revealed_count(&self) -> usize {
        self.targets.values().filter(|t| t.revealed).count()
    }

    /// Reveal a target. Returns true only on the first transition.
    pub fn reveal(&mut self, id: TargetId) -> Result<bool, PageError> {
        let target = self
            .targets
            .get_mut(&id)
            .ok_or(PageError::UnknownTarget(id))?;
        if target.revealed {
            return Ok(false);
        }
        target.revealed = true;
        Ok(true)
    }

    /// Stop watching a target. Returns true if it was being watched.
    pub fn unobserve(&mut self, id: TargetId) -> bool {
        match self.targets.get_mut(&id) {
            Some(target) if target.observed => {
                target.observed = false;
                true
            }
            _ => false,
        }
    }

    /// Apply one batch of visibility notifications. Each entry is handled on
    /// its own; the order of reveals within a batch carries no meaning.
    pub fn handle_visibility(&mut self, entries: &[VisibilityEntry], out: &mut Outputs) {
        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }
            if !self.is_observed(entry.target) {
                debug!(
                    "ignoring visibility notification for unwatched target {:?}",
                    entry.target
                );
                continue;
            }
            if let Ok(true) = self.reveal(entry.target) {
                out.push_change(Change::Reveal {
                    target: entry.target,
                });
            }
            if self.unobserve(entry.target) {
                out.push_change(Change::Unobserve {
                    target: entry.target,
                });
            }
        }
    }

    /// Forget every watch (teardown). Revealed state is kept.
    pub fn disconnect(&mut self) {
        for target in self.targets.values_mut() {
            target.observed = false;
        }
    }
}
