//! Output contracts from the page engine.
//!
//! Outputs carry the host mutations produced by one call, in order, plus a
//! separate list of semantic events. Adapters apply changes to the DOM and
//! may forward events to diagnostics.

use serde::{Deserialize, Serialize};

use crate::contact::{StatusTone, SubmissionRequest, SubmissionState};
use crate::ids::TargetId;

/// One host mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Replace the text of the cycle display surface.
    Text { text: String },
    /// Put the target into its visible presentation state.
    Reveal { target: TargetId },
    /// Stop watching the target for visibility.
    Unobserve { target: TargetId },
    /// Replace the contact status text.
    Status { text: String, tone: StatusTone },
    /// Clear the contact form fields.
    ResetForm,
    /// Perform the POST described by the request and report back through
    /// Engine::complete_contact().
    Dispatch { request: SubmissionRequest },
    /// Disconnect the visibility monitor entirely.
    Disconnect,
}

/// Discrete semantic signals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum PageEvent {
    TextCycleStarted,
    WordAdvanced { word_index: usize },
    /// The display surface went away; no further steps are scheduled.
    CycleHalted,
    SubmissionSettled { state: SubmissionState },
    TornDown,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<PageEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: PageEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn append(&mut self, mut other: Outputs) {
        self.changes.append(&mut other.changes);
        self.events.append(&mut other.events);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Targets revealed by these outputs, in order.
    pub fn revealed(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.changes.iter().filter_map(|c| match c {
            Change::Reveal { target } => Some(*target),
            _ => None,
        })
    }

    /// The last text written to the display surface, if any.
    pub fn last_text(&self) -> Option<&str> {
        self.changes.iter().rev().find_map(|c| match c {
            Change::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// The last status written, if any.
    pub fn last_status(&self) -> Option<(&str, StatusTone)> {
        self.changes.iter().rev().find_map(|c| match c {
            Change::Status { text, tone } => Some((text.as_str(), *tone)),
            _ => None,
        })
    }

    pub fn dispatched(&self) -> Option<&SubmissionRequest> {
        self.changes.iter().find_map(|c| match c {
            Change::Dispatch { request } => Some(request),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_serialize_with_kind_tag() {
        let change = Change::Reveal {
            target: TargetId(3),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "reveal", "target": 3 }));
    }

    #[test]
    fn last_text_prefers_latest_write() {
        let mut out = Outputs::default();
        out.push_change(Change::Text { text: "a".into() });
        out.push_change(Change::Reveal {
            target: TargetId(0),
        });
        out.push_change(Change::Text { text: "ab".into() });
        assert_eq!(out.last_text(), Some("ab"));
        assert_eq!(out.revealed().collect::<Vec<_>>(), vec![TargetId(0)]);
    }
}
