//! Host state shared by every DOM callback, and the code that applies core
//! outputs to the document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use folio_page_core::{
    Change, Engine, LoadElement, Outputs, PageError, StatusTone, SubmissionRequest, TargetId,
};
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, IntersectionObserver};

use crate::contact;

/// Attribute carrying the core handle on every tracked element.
pub(crate) const TARGET_ATTR: &str = "data-folio-target";
pub(crate) const VISIBLE_CLASS: &str = "visible";

pub(crate) type SharedHost = Rc<RefCell<Host>>;

pub(crate) struct Host {
    pub core: Engine,
    pub elements: HashMap<TargetId, Element>,
    pub surface: Option<Element>,
    pub form: Option<HtmlFormElement>,
    pub status: Option<HtmlElement>,
    pub observer: Option<IntersectionObserver>,
    /// `requestAnimationFrame` timestamp that maps to virtual time zero.
    pub origin_ms: Option<f64>,
}

impl Host {
    pub fn new(core: Engine) -> Self {
        Self {
            core,
            elements: HashMap::new(),
            surface: None,
            form: None,
            status: None,
            observer: None,
            origin_ms: None,
        }
    }

    pub fn track(&mut self, id: TargetId, element: Element) {
        if let Err(e) = element.set_attribute(TARGET_ATTR, &id.0.to_string()) {
            warn!("could not tag element {id:?}: {e:?}");
        }
        self.elements.insert(id, element);
    }

    /// Core handle for a load-stage element. An element already tracked as a
    /// scroll target keeps its handle.
    pub fn register(&mut self, element: Element) -> TargetId {
        if let Some(id) = target_of(&element).filter(|id| self.elements.contains_key(id)) {
            return id;
        }
        let id = self.core.register_target();
        self.track(id, element);
        id
    }

    /// Apply outputs to the document. Dispatches are handed back because
    /// sending them needs the shared handle, not `&mut self`.
    pub fn apply(&mut self, outputs: Outputs) -> Vec<SubmissionRequest> {
        let mut dispatches = Vec::new();
        for change in outputs.changes {
            match change {
                Change::Text { text } => {
                    if let Some(surface) = &self.surface {
                        surface.set_text_content(Some(&text));
                    }
                }
                Change::Reveal { target } => {
                    if let Some(el) = self.elements.get(&target) {
                        if let Err(e) = el.class_list().add_1(VISIBLE_CLASS) {
                            warn!("reveal {target:?} failed: {e:?}");
                        }
                    }
                }
                Change::Unobserve { target } => {
                    if let (Some(observer), Some(el)) = (&self.observer, self.elements.get(&target))
                    {
                        observer.unobserve(el);
                    }
                }
                Change::Status { text, tone } => self.write_status(&text, tone),
                Change::ResetForm => {
                    if let Some(form) = &self.form {
                        form.reset();
                    }
                }
                Change::Dispatch { request } => dispatches.push(request),
                Change::Disconnect => {
                    if let Some(observer) = self.observer.take() {
                        observer.disconnect();
                    }
                }
            }
        }
        for event in outputs.events {
            debug!("page event: {event:?}");
        }
        dispatches
    }

    fn write_status(&self, text: &str, tone: StatusTone) {
        let Some(status) = &self.status else {
            return;
        };
        status.set_text_content(Some(text));
        let style = status.style();
        let result = match tone.css_color() {
            Some(color) => style.set_property("color", color),
            None => style.remove_property("color").map(|_| ()),
        };
        if let Err(e) = result {
            debug!("status colour not applied: {e:?}");
        }
    }
}

/// Run `f` against the host, apply its outputs, then send any dispatches.
pub(crate) fn drive<F>(host: &SharedHost, f: F)
where
    F: FnOnce(&mut Host) -> Outputs,
{
    let dispatches = {
        let mut h = host.borrow_mut();
        let out = f(&mut h);
        h.apply(out)
    };
    for request in dispatches {
        contact::dispatch(host.clone(), request);
    }
}

pub(crate) fn target_of(element: &Element) -> Option<TargetId> {
    element
        .get_attribute(TARGET_ATTR)?
        .parse::<u32>()
        .ok()
        .map(TargetId)
}

/// `querySelectorAll` collected into elements; an invalid selector yields none.
pub(crate) fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    collect(root.query_selector_all(selector), selector)
}

pub(crate) fn query_all_in(document: &Document, selector: &str) -> Vec<Element> {
    collect(document.query_selector_all(selector), selector)
}

fn collect(
    list: Result<web_sys::NodeList, wasm_bindgen::JsValue>,
    selector: &str,
) -> Vec<Element> {
    let list = match list {
        Ok(list) => list,
        Err(e) => {
            warn!("selector {selector:?} rejected: {e:?}");
            return Vec::new();
        }
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Classify every `.animate-on-load` element. A hero without its text or
/// image block is an error.
pub(crate) fn classify_load_stage(
    host: &mut Host,
    document: &Document,
) -> Result<Vec<LoadElement>, PageError> {
    let mut elements = Vec::new();
    for el in query_all_in(document, ".animate-on-load") {
        let classes = el.class_list();
        let element = if classes.contains("logo") {
            LoadElement::Brand {
                target: host.register(el),
            }
        } else if classes.contains("nav-links") {
            let links = query_all(&el, "li a")
                .into_iter()
                .map(|link| host.register(link))
                .collect();
            LoadElement::Navigation { links }
        } else if el.id() == "hero" {
            let text = banner_part(&el, "hero-text")?;
            let image = banner_part(&el, "hero-image")?;
            LoadElement::PrimaryBanner {
                container: host.register(el),
                text: host.register(text),
                image: host.register(image),
            }
        } else {
            LoadElement::Generic {
                target: host.register(el),
            }
        };
        elements.push(element);
    }
    Ok(elements)
}

fn banner_part(banner: &Element, class: &str) -> Result<Element, PageError> {
    banner
        .query_selector(&format!(".{class}"))
        .ok()
        .flatten()
        .ok_or_else(|| PageError::MissingBannerPart {
            part: class.to_string(),
        })
}
