//! Page configuration.
//!
//! Every field has a default matching the shipped page, so hosts can pass a
//! partial JSON object (or nothing) and override only what they need.

use serde::{Deserialize, Serialize};

use crate::error::PageError;
use crate::Millis;

/// Access key value that marks an unconfigured contact form.
pub const PLACEHOLDER_ACCESS_KEY: &str = "YOUR_ACCESS_KEY_HERE";
pub const DEFAULT_ENDPOINT: &str = "https://api.web3forms.com/submit";

/// Elements revealed when they scroll into view.
pub const DEFAULT_SCROLL_SELECTORS: [&str; 12] = [
    ".section-title",
    ".section-title-about",
    ".about-image.fade-left",
    ".about-content.fade-right",
    ".skill-card.bounce-up",
    ".project-card.fade-up",
    ".achievement-card.fade-up",
    ".experience-timeline .timeline-item.fade-up",
    ".education-timeline .timeline-item.fade-up",
    ".contact-wrapper.fade-up",
    "footer .container.fade-up",
    "#resume .resume-options.fade-up",
];

pub const DEFAULT_WORDS: [&str; 3] = ["Web Developer", "Creator", "Problem Solver"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub words: Vec<String>,
    pub typing_interval_ms: Millis,
    pub deleting_interval_ms: Millis,
    pub hold_before_delete_ms: Millis,
    pub pause_before_next_ms: Millis,
    pub observer: ObserverConfig,
    pub load_stage: LoadStageConfig,
    pub contact: ContactConfig,
    pub scroll_selectors: Vec<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| (*w).to_string()).collect(),
            typing_interval_ms: 200,
            deleting_interval_ms: 100,
            hold_before_delete_ms: 2000,
            pause_before_next_ms: 500,
            observer: ObserverConfig::default(),
            load_stage: LoadStageConfig::default(),
            contact: ContactConfig::default(),
            scroll_selectors: DEFAULT_SCROLL_SELECTORS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl PageConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(text: &str) -> Result<Self, PageError> {
        serde_json::from_str(text).map_err(|e| PageError::invalid_config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), PageError> {
        let threshold = self.observer.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PageError::invalid_config(format!(
                "observer threshold {threshold} is outside [0, 1]"
            )));
        }
        if self.typing_interval_ms == 0 || self.deleting_interval_ms == 0 {
            return Err(PageError::invalid_config(
                "typing and deleting intervals must be non-zero",
            ));
        }
        Ok(())
    }

    /// The selector list joined for a single `querySelectorAll` call.
    pub fn scroll_selector(&self) -> String {
        self.scroll_selectors.join(", ")
    }
}

/// Visibility monitor settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Fraction of the element area that must be visible.
    pub threshold: f64,
    /// Bottom root margin in px; negative values contract the viewport.
    pub root_margin_bottom_px: i32,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_bottom_px: -50,
        }
    }
}

/// Delays for the initial-load reveal sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadStageConfig {
    pub generic_delay_ms: Millis,
    pub brand_delay_ms: Millis,
    pub nav_base_ms: Millis,
    pub nav_step_ms: Millis,
    pub banner_delay_ms: Millis,
}

impl Default for LoadStageConfig {
    fn default() -> Self {
        Self {
            generic_delay_ms: 100,
            brand_delay_ms: 300,
            nav_base_ms: 500,
            nav_step_ms: 100,
            banner_delay_ms: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub access_key: String,
    pub endpoint: String,
    /// How long a status message stays before it is blanked.
    pub status_clear_ms: Millis,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            access_key: PLACEHOLDER_ACCESS_KEY.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            status_clear_ms: 7000,
        }
    }
}

impl ContactConfig {
    pub fn with_access_key(key: impl Into<String>) -> Self {
        Self {
            access_key: key.into(),
            ..Self::default()
        }
    }

    /// False when the key is empty or still the placeholder.
    pub fn is_configured(&self) -> bool {
        let key = self.access_key.trim();
        !key.is_empty() && key != PLACEHOLDER_ACCESS_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PageConfig::from_json(r#"{ "typing_interval_ms": 50, "contact": { "access_key": "abc" } }"#)
            .unwrap();
        assert_eq!(cfg.typing_interval_ms, 50);
        assert_eq!(cfg.deleting_interval_ms, 100);
        assert_eq!(cfg.contact.access_key, "abc");
        assert_eq!(cfg.contact.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.contact.status_clear_ms, 7000);
        assert_eq!(cfg.words.len(), 3);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let mut cfg = PageConfig::default();
        cfg.observer.threshold = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(PageError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn placeholder_and_blank_keys_are_unconfigured() {
        assert!(!ContactConfig::default().is_configured());
        assert!(!ContactConfig::with_access_key("").is_configured());
        assert!(!ContactConfig::with_access_key("  ").is_configured());
        assert!(ContactConfig::with_access_key("15fed34b").is_configured());
    }

    #[test]
    fn scroll_selector_joins_with_commas() {
        let cfg = PageConfig {
            scroll_selectors: vec![".a".into(), ".b .c".into()],
            ..PageConfig::default()
        };
        assert_eq!(cfg.scroll_selector(), ".a, .b .c");
    }
}
