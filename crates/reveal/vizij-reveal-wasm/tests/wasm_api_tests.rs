#![cfg(target_arch = "wasm32")]
use js_sys::{Reflect, JSON};
use vizij_reveal_wasm::{abi_version, VizijReveal};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn js(json: &str) -> JsValue {
    JSON::parse(json).unwrap()
}

fn div() -> Element {
    let doc = web_sys::window().unwrap().document().unwrap();
    doc.create_element("div").unwrap()
}

fn clear_session() {
    web_sys::window()
        .unwrap()
        .session_storage()
        .unwrap()
        .unwrap()
        .clear()
        .unwrap();
}

fn get(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn abi_version_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn observe_returns_pending_token() {
    let mut r = VizijReveal::new(JsValue::UNDEFINED).unwrap();
    let el = div();
    let id = r
        .observe(el.clone(), js(r#"{ "family": "left" }"#))
        .unwrap();
    assert_eq!(r.token(id).as_deref(), Some("scroll-slide-left"));
    assert_eq!(el.get_attribute("data-reveal-id"), Some(id.to_string()));

    assert!(r.release(id));
    assert!(!r.release(id));
    assert_eq!(el.get_attribute("data-reveal-id"), None);
}

#[wasm_bindgen_test]
fn observing_a_node_twice_keeps_one_registration() {
    let mut r = VizijReveal::new(JsValue::UNDEFINED).unwrap();
    let el = div();
    let first = r.observe(el.clone(), JsValue::UNDEFINED).unwrap();
    let second = r
        .observe(el.clone(), js(r#"{ "family": "scale" }"#))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(r.token(first).as_deref(), Some("scroll-fade-up"));
    assert_eq!(el.get_attribute("data-reveal-id"), Some(first.to_string()));

    let other = r.observe(div(), JsValue::UNDEFINED).unwrap();
    assert_ne!(other, first);

    // after release the node can be observed afresh
    assert!(r.release(first));
    let again = r.observe(el, JsValue::UNDEFINED).unwrap();
    assert_ne!(again, first);
}

#[wasm_bindgen_test]
fn group_items_carry_class_and_delay() {
    let mut r = VizijReveal::new(JsValue::NULL).unwrap();
    let id = r
        .observe_group(div(), 3, js(r#"{ "staggerMs": 100 }"#))
        .unwrap();
    let props = r.item_props(id, 2).unwrap();
    assert_eq!(
        get(&props, "className").as_string().as_deref(),
        Some("scroll-animate-item stagger-index-2")
    );
    let style = get(&props, "style");
    assert_eq!(
        get(&style, "transitionDelay").as_string().as_deref(),
        Some("0ms")
    );
    assert!(r.item_props(id, 3).unwrap().is_undefined());
}

#[wasm_bindgen_test]
fn count_up_starts_at_zero() {
    let mut r = VizijReveal::new(JsValue::UNDEFINED).unwrap();
    let pct = r
        .observe_count_up(div(), "120".into(), "%".into(), JsValue::UNDEFINED)
        .unwrap();
    let na = r
        .observe_count_up(div(), "N/A".into(), "".into(), JsValue::UNDEFINED)
        .unwrap();
    assert_eq!(r.display(pct).as_deref(), Some("0%"));
    assert_eq!(r.display(na).as_deref(), Some("N/A"));
    let out = r.update(0.0).unwrap();
    assert!(Reflect::has(&out, &JsValue::from_str("changes")).unwrap());
}

#[wasm_bindgen_test]
fn bad_inputs_are_errors() {
    assert!(VizijReveal::new(js(r#"{ "scroll": { "threshold": 2 } }"#)).is_err());
    let mut r = VizijReveal::new(JsValue::UNDEFINED).unwrap();
    assert!(r.observe(div(), js(r#"{ "threshold": -1 }"#)).is_err());
    assert!(r.observe(div(), js(r#"{ "family": "spin" }"#)).is_err());
}

#[wasm_bindgen_test]
fn hero_plays_once_per_session() {
    clear_session();
    let cfg = r#"{ "hero": { "respect_reduced_motion": false } }"#;

    let mut first = VizijReveal::new(js(cfg)).unwrap();
    assert_eq!(first.hero_presentation(), "placeholder");
    assert_eq!(first.resolve_hero(), "play");
    assert_eq!(first.hero_presentation(), "animated");
    assert!(first.hero_played());

    let mut reload = VizijReveal::new(js(cfg)).unwrap();
    assert_eq!(reload.resolve_hero(), "skip");
    assert_eq!(reload.hero_presentation(), "static");
    assert_eq!(reload.replay_hero(), "play");

    reload.reset_hero();
    assert!(!reload.hero_played());
    reload.skip_next_hero();
    assert!(reload.hero_played());
    clear_session();
}

#[wasm_bindgen_test]
fn hero_css_variables_are_an_object() {
    let r = VizijReveal::new(JsValue::UNDEFINED).unwrap();
    let vars = r.hero_css_variables().unwrap();
    assert_eq!(
        get(&vars, "--hero-easing").as_string().as_deref(),
        Some("cubic-bezier(0.22, 1, 0.36, 1)")
    );
}
