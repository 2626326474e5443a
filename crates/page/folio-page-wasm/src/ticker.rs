//! `requestAnimationFrame` loop that advances the core clock.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio_page_core::Inputs;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::dom::{self, SharedHost};

type FrameCallback = Closure<dyn FnMut(f64)>;

pub(crate) struct Ticker {
    frame: Rc<RefCell<Option<FrameCallback>>>,
    handle: Rc<Cell<Option<i32>>>,
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// One frame: map the timestamp onto virtual time and step the engine.
fn tick(host: &SharedHost, timestamp: f64) {
    dom::drive(host, |h| {
        let origin = *h.origin_ms.get_or_insert(timestamp);
        let now = (timestamp - origin).max(0.0) as u64;
        let dt = now.saturating_sub(h.core.now());
        let inputs = Inputs {
            visibility: Vec::new(),
            text_surface_attached: h.surface.as_ref().map(|s| s.is_connected()),
        };
        h.core.update(dt, inputs)
    });
}

impl Ticker {
    pub fn start(host: SharedHost) -> Result<Self, JsValue> {
        let frame: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));

        let next = frame.clone();
        let next_handle = handle.clone();
        *frame.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
            tick(&host, timestamp);
            next_handle.set(None);
            if let Some(callback) = next.borrow().as_ref() {
                next_handle.set(request_frame(callback).ok());
            }
        }));

        if let Some(callback) = frame.borrow().as_ref() {
            handle.set(Some(request_frame(callback)?));
        }
        Ok(Self { frame, handle })
    }

    /// Cancel the pending frame and release the loop closure.
    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        self.frame.borrow_mut().take();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
