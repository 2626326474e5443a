//! wasm-bindgen interface for the folio page.
//!
//! `FolioPage::mount` binds the core engine to the live document: the typing
//! surface, scroll and load-stage reveals, the contact form, anchor links and
//! the achievement lightbox. Hosts that drive their own clock can skip
//! `mount` and call `update` directly; it returns the outputs as JSON without
//! touching the DOM.

mod contact;
mod dom;
mod interactions;
mod logger;
mod ticker;

use std::cell::RefCell;
use std::rc::Rc;

use folio_page_core::{
    CycleState, Engine, Inputs, Outputs, PageConfig, SubmissionState, TargetId, VisibilityEntry,
};
use log::{info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen as swb;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Event, HtmlElement, HtmlFormElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::dom::{drive, Host, SharedHost};
use crate::interactions::{LightboxBinding, Listener};
use crate::ticker::Ticker;

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn js_error(context: &'static str) -> impl Fn(JsValue) -> JsError {
    move |e| JsError::new(&format!("{context}: {e:?}"))
}

/// Constructor config: the page config plus host-only settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostConfig {
    #[serde(flatten)]
    page: PageConfig,
    /// `error` | `warn` | `info` | `debug` | `trace` | `off`
    log_level: Option<String>,
}

#[derive(Serialize)]
struct Snapshot {
    now_ms: u64,
    cycle: CycleState,
    cycle_running: bool,
    submission: SubmissionState,
    pending_timers: usize,
    lightbox_open: bool,
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Everything that must stay alive while the page is mounted.
#[derive(Default)]
struct Bindings {
    observer_callback: Option<ObserverCallback>,
    listeners: Vec<Listener>,
    lightbox: Option<LightboxBinding>,
    ticker: Option<Ticker>,
}

#[wasm_bindgen]
pub struct FolioPage {
    host: SharedHost,
    bindings: Option<Bindings>,
}

#[wasm_bindgen]
impl FolioPage {
    /// Create a page controller. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new FolioPage({ contact: { access_key: "..." }, log_level: "debug" })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FolioPage, JsError> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let cfg: HostConfig = if jsvalue_is_undefined_or_null(&config) {
            HostConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let level = match cfg.log_level.as_deref() {
            Some(raw) => raw
                .parse::<LevelFilter>()
                .map_err(|e| JsError::new(&format!("config error: log_level: {e}")))?,
            None => LevelFilter::Info,
        };
        logger::init(level);

        let core = Engine::new(cfg.page).map_err(|e| JsError::new(&format!("config error: {e}")))?;
        Ok(FolioPage {
            host: Rc::new(RefCell::new(Host::new(core))),
            bindings: None,
        })
    }

    /// Bind to the current document. Calling it again is a no-op. A failed
    /// mount tears the engine down.
    #[wasm_bindgen]
    pub fn mount(&mut self) -> Result<(), JsError> {
        if self.bindings.is_some() {
            return Ok(());
        }
        match self.bind() {
            Ok(bindings) => {
                self.bindings = Some(bindings);
                info!("folio page mounted");
                Ok(())
            }
            Err(e) => {
                drive(&self.host, |h| h.core.teardown());
                Err(e)
            }
        }
    }
}

impl FolioPage {
    fn bind(&mut self) -> Result<Bindings, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("mount: no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("mount: no document"))?;
        let mut bindings = Bindings::default();

        // Text cycle
        let surface = document.query_selector(".typing-text").ok().flatten();
        let present = surface.is_some();
        self.host.borrow_mut().surface = surface;
        drive(&self.host, |h| h.core.start_text_cycle(present));

        // Scroll reveal
        let (selector, options) = {
            let h = self.host.borrow();
            (h.core.config().scroll_selector(), h.core.observer_options())
        };
        let watched = dom::query_all_in(&document, &selector);
        if !watched.is_empty() {
            let callback_host = self.host.clone();
            let callback: ObserverCallback = Closure::new(
                move |entries: js_sys::Array, _observer: IntersectionObserver| {
                    let visibility: Vec<VisibilityEntry> = entries
                        .iter()
                        .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                        .filter_map(|entry| {
                            Some(VisibilityEntry {
                                target: dom::target_of(&entry.target())?,
                                is_intersecting: entry.is_intersecting(),
                                ratio: entry.intersection_ratio(),
                            })
                        })
                        .collect();
                    drive(&callback_host, |h| {
                        h.core.update(0, Inputs::visibility(visibility))
                    });
                },
            );
            let init = IntersectionObserverInit::new();
            init.set_threshold(&JsValue::from_f64(options.threshold));
            init.set_root_margin(&options.root_margin);
            let observer =
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                    .map_err(js_error("mount: IntersectionObserver"))?;

            let mut h = self.host.borrow_mut();
            let ids = h.core.register_scroll_targets(watched.len());
            for (id, el) in ids.into_iter().zip(watched) {
                observer.observe(&el);
                h.track(id, el);
            }
            h.observer = Some(observer);
            bindings.observer_callback = Some(callback);
        }

        // Load stage
        let elements = {
            let mut h = self.host.borrow_mut();
            dom::classify_load_stage(&mut h, &document)
                .map_err(|e| JsError::new(&format!("mount: load stage: {e}")))?
        };
        drive(&self.host, |h| h.core.schedule_load_stage(&elements));

        // Contact form
        let form = document
            .get_element_by_id("contact-form")
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok());
        if let Some(form) = form {
            {
                let mut h = self.host.borrow_mut();
                h.form = Some(form.clone());
                h.status = document
                    .get_element_by_id("form-result")
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            }
            drive(&self.host, |h| h.core.mount_contact());

            let submit_host = self.host.clone();
            let submitted = form.clone();
            let listener = Listener::new(&form, "submit", move |event: Event| {
                event.prevent_default();
                let fields = contact::collect_fields(&submitted);
                drive(&submit_host, |h| match h.core.submit_contact(fields) {
                    Ok(out) => out,
                    Err(e) => {
                        warn!("contact submission ignored: {e}");
                        Outputs::default()
                    }
                });
            })
            .map_err(js_error("mount: contact form"))?;
            bindings.listeners.push(listener);
        }

        // Anchors and lightbox
        bindings.listeners.extend(
            interactions::bind_anchors(&document).map_err(js_error("mount: anchors"))?,
        );
        bindings.lightbox =
            interactions::bind_lightbox(&document).map_err(js_error("mount: lightbox"))?;

        bindings.ticker =
            Some(Ticker::start(self.host.clone()).map_err(js_error("mount: animation frame"))?);
        Ok(bindings)
    }
}

#[wasm_bindgen]
impl FolioPage {

    /// Stop the frame loop, drop every listener and disconnect the observer.
    #[wasm_bindgen]
    pub fn teardown(&mut self) {
        drive(&self.host, |h| h.core.teardown());
        if let Some(bindings) = self.bindings.take() {
            if let Some(ticker) = &bindings.ticker {
                ticker.stop();
            }
            drop(bindings);
        }
    }

    /// Start the word cycle without a DOM surface. Returns Outputs JSON.
    #[wasm_bindgen(js_name = start_text_cycle)]
    pub fn start_text_cycle(&mut self, surface_present: bool) -> Result<JsValue, JsError> {
        let out = self.host.borrow_mut().core.start_text_cycle(surface_present);
        swb::to_value(&out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Allocate `count` visibility-watched targets. Returns their ids.
    #[wasm_bindgen(js_name = register_scroll_targets)]
    pub fn register_scroll_targets(&mut self, count: u32) -> Vec<u32> {
        self.host
            .borrow_mut()
            .core
            .register_scroll_targets(count as usize)
            .into_iter()
            .map(|id| id.0)
            .collect()
    }

    /// Reveal a target now (idempotent). Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn reveal(&mut self, target: u32) -> Result<JsValue, JsError> {
        let out = self
            .host
            .borrow_mut()
            .core
            .reveal(TargetId(target))
            .map_err(|e| JsError::new(&format!("reveal error: {e}")))?;
        swb::to_value(&out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Step the engine by dt (ms) with inputs JSON. Returns Outputs JSON.
    /// The outputs are not applied to the document.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f64, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs_json) {
            Inputs::default()
        } else {
            swb::from_value(inputs_json).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let dt = if dt.is_finite() && dt > 0.0 { dt as u64 } else { 0 };
        let out = self.host.borrow_mut().core.update(dt, inputs);
        swb::to_value(&out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Current engine state as JSON (clock, cycle, submission, timers).
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        let h = self.host.borrow();
        let snapshot = Snapshot {
            now_ms: h.core.now(),
            cycle: h.core.cycle_state(),
            cycle_running: h.core.is_cycle_running(),
            submission: h.core.submission_state(),
            pending_timers: h.core.pending_timers(),
            lightbox_open: self
                .bindings
                .as_ref()
                .and_then(|b| b.lightbox.as_ref())
                .is_some_and(LightboxBinding::is_open),
        };
        swb::to_value(&snapshot).map_err(|e| JsError::new(&format!("snapshot error: {e}")))
    }
}

impl Drop for FolioPage {
    fn drop(&mut self) {
        if self.bindings.is_some() {
            self.teardown();
        }
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
