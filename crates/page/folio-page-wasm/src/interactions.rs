//! Event bindings for anchor navigation and the image lightbox.
//!
//! Every listener is owned by a [`Listener`] and removed when it is dropped,
//! so bindings live exactly as long as the mounted page.

use std::cell::RefCell;
use std::rc::Rc;

use folio_page_core::{AnchorNavigator, ClickTarget, Layout, Lightbox, LightboxView, ScrollBehavior};
use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlImageElement, Node, ScrollToOptions,
    Window,
};

use crate::dom::query_all_in;

pub(crate) struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, kind: &'static str, f: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(f);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

struct DomLayout<'a> {
    document: &'a Document,
    window: &'a Window,
}

impl Layout for DomLayout<'_> {
    fn element_top(&self, id: &str) -> Option<f64> {
        self.document
            .get_element_by_id(id)
            .map(|el| el.get_bounding_client_rect().top())
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn header_height(&self) -> Option<f64> {
        self.document
            .query_selector("header")
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()
            .map(|header| f64::from(header.offset_height()))
    }
}

/// Smooth, header-compensated scrolling for every `a[href^="#"]`.
pub(crate) fn bind_anchors(document: &Document) -> Result<Vec<Listener>, JsValue> {
    let navigator = AnchorNavigator::new();
    let mut listeners = Vec::new();
    for anchor in query_all_in(document, "a[href^=\"#\"]") {
        let link = anchor.clone();
        listeners.push(Listener::new(&anchor, "click", move |event: Event| {
            let Some(href) = link.get_attribute("href") else {
                return;
            };
            if !navigator.intercepts(&href) {
                return;
            }
            event.prevent_default();
            let Some(window) = web_sys::window() else {
                return;
            };
            let Some(document) = window.document() else {
                return;
            };
            let layout = DomLayout {
                document: &document,
                window: &window,
            };
            let Some(request) = navigator.navigate(&href, &layout) else {
                debug!("anchor {href} has no target");
                return;
            };
            let options = ScrollToOptions::new();
            options.set_top(request.top);
            options.set_behavior(match request.behavior {
                ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
                ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
            });
            window.scroll_to_with_scroll_to_options(&options);
        })?);
    }
    Ok(listeners)
}

pub(crate) struct LightboxBinding {
    state: Rc<RefCell<Lightbox>>,
    _listeners: Vec<Listener>,
}

impl LightboxBinding {
    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }
}

fn render(document: &Document, view: &LightboxView) {
    let Some(modal) = document
        .get_element_by_id("imageModal")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let display = match view {
        LightboxView::Closed => "none",
        LightboxView::Open { image_src, caption } => {
            if let Some(img) = document
                .get_element_by_id("modalImage")
                .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
            {
                img.set_src(image_src);
            }
            if let Some(label) = document.get_element_by_id("modalCaption") {
                label.set_text_content(Some(caption));
            }
            "block"
        }
    };
    if let Err(e) = modal.style().set_property("display", display) {
        debug!("lightbox display not applied: {e:?}");
    }
}

fn text_of(root: &Element, selector: &str) -> String {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.text_content())
        .unwrap_or_default()
}

/// Wire the achievement gallery to the shared modal. `None` when the page
/// has no modal.
pub(crate) fn bind_lightbox(document: &Document) -> Result<Option<LightboxBinding>, JsValue> {
    let Some(modal) = document.get_element_by_id("imageModal") else {
        return Ok(None);
    };
    let state = Rc::new(RefCell::new(Lightbox::new()));
    let mut listeners = Vec::new();

    for img in query_all_in(document, "#achievements .achievement-card img") {
        let Ok(image) = img.clone().dyn_into::<HtmlImageElement>() else {
            continue;
        };
        let state = state.clone();
        let doc = document.clone();
        listeners.push(Listener::new(&img, "click", move |_event: Event| {
            // Caption comes from the sibling content block's heading and text.
            let (heading, body) = match image.next_element_sibling() {
                Some(content) => (text_of(&content, "h4"), text_of(&content, "p")),
                None => (String::new(), String::new()),
            };
            let mut lightbox = state.borrow_mut();
            render(&doc, lightbox.open(&image.src(), &heading, &body));
        })?);
    }

    if let Some(close) = document.query_selector(".modal .close").ok().flatten() {
        let state = state.clone();
        let doc = document.clone();
        listeners.push(Listener::new(&close, "click", move |_event: Event| {
            if let Some(view) = state.borrow_mut().handle_click(ClickTarget::CloseControl) {
                render(&doc, view);
            }
        })?);
    }

    {
        let state = state.clone();
        let doc = document.clone();
        let backdrop = modal.clone();
        listeners.push(Listener::new(&modal, "click", move |event: Event| {
            let backdrop_node: &Node = &backdrop;
            let target = match event.target().and_then(|t| t.dyn_into::<Node>().ok()) {
                Some(node) if node.is_same_node(Some(backdrop_node)) => ClickTarget::Backdrop,
                Some(node) if node.dyn_ref::<HtmlImageElement>().is_some() => ClickTarget::Image,
                _ => ClickTarget::Other,
            };
            if let Some(view) = state.borrow_mut().handle_click(target) {
                render(&doc, view);
            }
        })?);
    }

    Ok(Some(LightboxBinding {
        state,
        _listeners: listeners,
    }))
}
