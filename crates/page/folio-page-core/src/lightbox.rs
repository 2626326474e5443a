//! Image lightbox state.

use serde::{Deserialize, Serialize};

/// What the modal should display.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightboxView {
    #[default]
    Closed,
    Open { image_src: String, caption: String },
}

/// Where a click inside the lightbox landed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    /// The modal backdrop itself, outside the image.
    Backdrop,
    Image,
    CloseControl,
    Other,
}

pub fn caption(heading: &str, body: &str) -> String {
    format!("{heading}: {body}")
}

#[derive(Debug, Default)]
pub struct Lightbox {
    view: LightboxView,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &LightboxView {
        &self.view
    }

    pub fn is_open(&self) -> bool {
        matches!(self.view, LightboxView::Open { .. })
    }

    pub fn open(&mut self, image_src: &str, heading: &str, body: &str) -> &LightboxView {
        self.view = LightboxView::Open {
            image_src: image_src.to_string(),
            caption: caption(heading, body),
        };
        &self.view
    }

    pub fn close(&mut self) -> &LightboxView {
        self.view = LightboxView::Closed;
        &self.view
    }

    /// Returns the new view when the click changed it.
    pub fn handle_click(&mut self, target: ClickTarget) -> Option<&LightboxView> {
        match target {
            ClickTarget::Backdrop | ClickTarget::CloseControl if self.is_open() => {
                Some(self.close())
            }
            _ => None,
        }
    }
}
