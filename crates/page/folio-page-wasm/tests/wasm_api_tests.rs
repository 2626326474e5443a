#![cfg(target_arch = "wasm32")]
use folio_page_wasm::{abi_version, FolioPage};
use js_sys::{Array, Reflect};
use serde_json::json;
use serde_wasm_bindgen as swb;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r##"
<header style="height: 60px">header</header>
<span class="typing-text"></span>
<nav><ul class="nav-links animate-on-load"><li><a href="#about">About</a></li></ul></nav>
<section id="hero" class="animate-on-load">
  <div class="hero-text">hi</div>
  <div class="hero-image"></div>
</section>
<section id="about"><h2 class="section-title fade-up">About</h2></section>
"##;

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(FolioPage::new(JsValue::UNDEFINED).is_ok());
    assert!(FolioPage::new(JsValue::NULL).is_ok());
}

#[wasm_bindgen_test]
fn empty_word_list_is_rejected() {
    let cfg = swb::to_value(&json!({ "words": [] })).unwrap();
    assert!(FolioPage::new(cfg).is_err());
}

#[wasm_bindgen_test]
fn unknown_log_level_is_rejected() {
    let cfg = swb::to_value(&json!({ "log_level": "loud" })).unwrap();
    assert!(FolioPage::new(cfg).is_err());
}

#[wasm_bindgen_test]
fn cycle_outputs_are_returned_as_json() {
    let mut page = FolioPage::new(JsValue::UNDEFINED).unwrap();
    let out = page.start_text_cycle(true).unwrap();
    let changes: Array = get(&out, "changes").dyn_into().unwrap();
    assert_eq!(changes.length(), 1);
    assert_eq!(get(&changes.get(0), "text").as_string().as_deref(), Some("W"));

    let out = page.update(200.0, JsValue::UNDEFINED).unwrap();
    let changes: Array = get(&out, "changes").dyn_into().unwrap();
    assert_eq!(get(&changes.get(0), "text").as_string().as_deref(), Some("We"));
}

#[wasm_bindgen_test]
fn visibility_inputs_reveal_registered_targets() {
    let mut page = FolioPage::new(JsValue::UNDEFINED).unwrap();
    let ids = page.register_scroll_targets(2);
    let inputs = swb::to_value(&json!({
        "visibility": [{ "target": ids[1], "is_intersecting": true, "ratio": 0.5 }]
    }))
    .unwrap();
    let out = page.update(0.0, inputs).unwrap();
    let changes: Array = get(&out, "changes").dyn_into().unwrap();
    let kinds: Vec<String> = changes
        .iter()
        .filter_map(|c| get(&c, "kind").as_string())
        .collect();
    assert_eq!(kinds, vec!["reveal", "unobserve"]);
}

#[wasm_bindgen_test]
fn mount_binds_the_document() {
    let doc = document();
    let body = doc.body().unwrap();
    body.set_inner_html(PAGE);

    let mut page = FolioPage::new(JsValue::UNDEFINED).unwrap();
    page.mount().unwrap();

    let typing = doc.query_selector(".typing-text").unwrap().unwrap();
    assert_eq!(typing.text_content().as_deref(), Some("W"));
    for part in [".hero-text", ".hero-image"] {
        let el = doc.query_selector(part).unwrap().unwrap();
        assert!(el.class_list().contains("visible"), "{part} not revealed");
    }
    let hero = doc.get_element_by_id("hero").unwrap();
    assert!(!hero.class_list().contains("visible"));

    let snapshot = page.snapshot().unwrap();
    assert_eq!(get(&snapshot, "cycle_running").as_bool(), Some(true));

    page.teardown();
    let snapshot = page.snapshot().unwrap();
    assert_eq!(get(&snapshot, "cycle_running").as_bool(), Some(false));
    body.set_inner_html("");
}

#[wasm_bindgen_test]
fn mount_fails_when_banner_parts_are_missing() {
    let doc = document();
    let body = doc.body().unwrap();
    body.set_inner_html(r#"<section id="hero" class="animate-on-load"></section>"#);

    let mut page = FolioPage::new(JsValue::UNDEFINED).unwrap();
    assert!(page.mount().is_err());
    page.teardown();
    body.set_inner_html("");
}

#[wasm_bindgen_test]
fn load_stage_element_keeps_its_scroll_handle() {
    let doc = document();
    let body = doc.body().unwrap();
    body.set_inner_html(r#"<h2 class="section-title animate-on-load">Title</h2>"#);

    let mut page = FolioPage::new(JsValue::UNDEFINED).unwrap();
    page.mount().unwrap();

    let title = doc.query_selector(".section-title").unwrap().unwrap();
    assert_eq!(title.get_attribute("data-folio-target").as_deref(), Some("0"));

    // Only the scroll handle exists, so the load stage reuses id 0.
    let inputs = swb::to_value(&json!({
        "visibility": [{ "target": 0, "is_intersecting": true, "ratio": 0.5 }]
    }))
    .unwrap();
    let out = page.update(0.0, inputs).unwrap();
    let changes: Array = get(&out, "changes").dyn_into().unwrap();
    let kinds: Vec<String> = changes
        .iter()
        .filter_map(|c| get(&c, "kind").as_string())
        .collect();
    assert_eq!(kinds, vec!["reveal", "unobserve"]);

    page.teardown();
    body.set_inner_html("");
}
