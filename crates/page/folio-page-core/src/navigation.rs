//! In-page anchor navigation with a fixed-header offset.

use serde::{Deserialize, Serialize};

/// Geometry the navigator needs from the host.
pub trait Layout {
    /// Top of the element with `id`, relative to the viewport.
    fn element_top(&self, id: &str) -> Option<f64>;
    /// Current vertical scroll position of the document.
    fn scroll_y(&self) -> f64;
    /// Rendered height of the page header, if there is one.
    fn header_height(&self) -> Option<f64>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollRequest {
    /// Absolute document offset to scroll to.
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Fragment id of a same-page link (`#about` -> `about`).
pub fn fragment_target(href: &str) -> Option<&str> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Document offset that puts an element just below a header of `header_height`.
pub fn scroll_offset(element_top: f64, scroll_y: f64, header_height: f64) -> f64 {
    element_top + scroll_y - header_height
}

#[derive(Copy, Clone, Debug, Default)]
pub struct AnchorNavigator {
    pub behavior: ScrollBehavior,
}

impl AnchorNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the default navigation for `href` should be suppressed.
    pub fn intercepts(&self, href: &str) -> bool {
        href.starts_with('#')
    }

    /// Work out where to scroll for `href`. `None` when the link is not a
    /// fragment link or its target does not exist.
    pub fn navigate<L: Layout + ?Sized>(&self, href: &str, layout: &L) -> Option<ScrollRequest> {
        let id = fragment_target(href)?;
        let top = layout.element_top(id)?;
        let header = layout.header_height().unwrap_or(0.0);
        Some(ScrollRequest {
            top: scroll_offset(top, layout.scroll_y(), header),
            behavior: self.behavior,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        top: Option<f64>,
        scroll: f64,
        header: Option<f64>,
    }

    impl Layout for Fixed {
        fn element_top(&self, id: &str) -> Option<f64> {
            if id == "about" {
                self.top
            } else {
                None
            }
        }
        fn scroll_y(&self) -> f64 {
            self.scroll
        }
        fn header_height(&self) -> Option<f64> {
            self.header
        }
    }

    #[test]
    fn only_non_empty_fragments_qualify() {
        assert_eq!(fragment_target("#about"), Some("about"));
        assert_eq!(fragment_target("#"), None);
        assert_eq!(fragment_target("/about"), None);
        assert!(AnchorNavigator::new().intercepts("#"));
    }

    #[test]
    fn subtracts_header_height() {
        let layout = Fixed {
            top: Some(300.0),
            scroll: 1200.0,
            header: Some(80.0),
        };
        let req = AnchorNavigator::new().navigate("#about", &layout).unwrap();
        assert_eq!(req.top, 1420.0);
        assert_eq!(req.behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn missing_header_means_no_offset() {
        let layout = Fixed {
            top: Some(-50.0),
            scroll: 500.0,
            header: None,
        };
        let req = AnchorNavigator::new().navigate("#about", &layout).unwrap();
        assert_eq!(req.top, 450.0);
    }

    #[test]
    fn missing_target_does_nothing() {
        let layout = Fixed {
            top: None,
            scroll: 0.0,
            header: Some(80.0),
        };
        assert!(AnchorNavigator::new().navigate("#about", &layout).is_none());
        assert!(AnchorNavigator::new().navigate("#contact", &layout).is_none());
    }
}
