use js_sys::{Function, Object, Reflect};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use vizij_reveal_core::{
    Config, ElementId, HeroDecision, HeroGate, HeroPresentation, MotionPreference, RevealDescriptor,
    RevealEngine,
};

pub mod dom;
pub mod normalize;

use dom::{DomMotion, DomVisibility, SessionStorageStore};
use normalize::merge_descriptor;

#[wasm_bindgen]
pub struct VizijReveal {
    core: RevealEngine<DomVisibility>,
    hero: HeroGate<SessionStorageStore>,
    motion: DomMotion,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemStyle {
    transition_delay: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemProps {
    class_name: String,
    style: ItemStyle,
}

fn decision_str(d: HeroDecision) -> &'static str {
    match d {
        HeroDecision::Undetermined => "undetermined",
        HeroDecision::Skip => "skip",
        HeroDecision::Play => "play",
    }
}

fn presentation_str(p: HeroPresentation) -> &'static str {
    match p {
        HeroPresentation::Placeholder => "placeholder",
        HeroPresentation::Static => "static",
        HeroPresentation::Animated => "animated",
    }
}

impl VizijReveal {
    fn descriptor(&self, descriptor: JsValue) -> Result<RevealDescriptor, JsError> {
        let base = self.core.default_descriptor();
        if jsvalue_is_undefined_or_null(&descriptor) {
            return Ok(base);
        }
        let raw: serde_json::Value = swb::from_value(descriptor)
            .map_err(|e| JsError::new(&format!("descriptor error: {e}")))?;
        merge_descriptor(&base, raw).map_err(|e| JsError::new(&format!("descriptor error: {e}")))
    }

    /// Bind `element` and run `attach` on a fresh id; unbinds again on failure.
    /// A node that is already bound keeps its id and registration.
    fn bind_with(
        &mut self,
        element: Element,
        attach: impl FnOnce(&mut RevealEngine<DomVisibility>, ElementId) -> Result<(), JsError>,
    ) -> Result<u32, JsError> {
        if let Some(id) = self.core.source().bound_id(&element) {
            log::debug!("element {id} already observed; ignoring");
            return Ok(id.0);
        }
        let id = self.core.reserve_element();
        self.core.source_mut().bind(id, element);
        if let Err(err) = attach(&mut self.core, id) {
            self.core.source_mut().unbind(id);
            return Err(err);
        }
        Ok(id.0)
    }
}

#[wasm_bindgen]
impl VizijReveal {
    /// Create a controller. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new VizijReveal({ scroll: { family: "fade-in", threshold: 0.2 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijReveal, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        cfg.validate()
            .map_err(|e| JsError::new(&format!("config error: {e}")))?;

        let motion = DomMotion;
        let hero = HeroGate::new(cfg.hero.clone(), SessionStorageStore::new());
        Ok(VizijReveal {
            core: RevealEngine::new(cfg, DomVisibility::new(), &motion),
            hero,
            motion,
        })
    }

    /// Observe a single reveal element. `descriptor` fields override the
    /// config's `scroll` section. Returns the element id.
    #[wasm_bindgen]
    pub fn observe(&mut self, element: Element, descriptor: JsValue) -> Result<u32, JsError> {
        let desc = self.descriptor(descriptor)?;
        self.bind_with(element, |core, id| {
            core.attach_reveal(id, desc)
                .map_err(|e| JsError::new(&format!("observe error: {e}")))
        })
    }

    /// Observe a container whose `len` children reveal with staggered delays.
    #[wasm_bindgen(js_name = observe_group)]
    pub fn observe_group(
        &mut self,
        container: Element,
        len: u32,
        descriptor: JsValue,
    ) -> Result<u32, JsError> {
        let desc = self.descriptor(descriptor)?;
        self.bind_with(container, |core, id| {
            core.attach_group(id, desc, len as usize)
                .map_err(|e| JsError::new(&format!("observe_group error: {e}")))
        })
    }

    /// Observe a count-up number. `value` is the target as authored
    /// (non-integers are shown verbatim).
    #[wasm_bindgen(js_name = observe_count_up)]
    pub fn observe_count_up(
        &mut self,
        element: Element,
        value: String,
        unit: String,
        descriptor: JsValue,
    ) -> Result<u32, JsError> {
        let desc = self.descriptor(descriptor)?;
        let cfg = self.core.config().count_up.clone();
        self.bind_with(element, |core, id| {
            core.attach_count_up(id, &value, &unit, desc, cfg)
                .map_err(|e| JsError::new(&format!("observe_count_up error: {e}")))
        })
    }

    /// Stop observing `id`. Returns false for unknown ids.
    #[wasm_bindgen]
    pub fn release(&mut self, id: u32) -> bool {
        let id = ElementId(id);
        let known = self.core.release(id);
        self.core.source_mut().unbind(id);
        known
    }

    /// Apply queued intersections and advance counters to `now_ms`
    /// (a rAF timestamp). Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, now_ms: f64) -> Result<JsValue, JsError> {
        let out = self.core.update(now_ms);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Current class token for `id`.
    #[wasm_bindgen]
    pub fn token(&self, id: u32) -> Option<String> {
        self.core.token(ElementId(id))
    }

    /// `{ className, style: { transitionDelay } }` for child `index` of a
    /// group, or undefined.
    #[wasm_bindgen(js_name = item_props)]
    pub fn item_props(&self, id: u32, index: u32) -> Result<JsValue, JsError> {
        let Some(item) = self.core.group_item(ElementId(id), index as usize) else {
            return Ok(JsValue::UNDEFINED);
        };
        let props = ItemProps {
            class_name: item.class_name(),
            style: ItemStyle {
                transition_delay: item.transition_delay_css(),
            },
        };
        swb::to_value(&props).map_err(|e| JsError::new(&format!("item_props error: {e}")))
    }

    /// Current count-up text for `id`.
    #[wasm_bindgen]
    pub fn display(&self, id: u32) -> Option<String> {
        self.core.count_up_display(ElementId(id))
    }

    /// True while a counter still needs frames; hosts can stop their rAF loop
    /// once this turns false.
    #[wasm_bindgen(js_name = is_animating)]
    pub fn is_animating(&self) -> bool {
        self.core.is_animating()
    }

    /// Register a callback fired when new intersections are queued.
    /// Pass undefined to clear.
    #[wasm_bindgen(js_name = set_listener)]
    pub fn set_listener(&mut self, listener: Option<Function>) {
        self.core.source_mut().set_listener(listener);
    }

    /// Re-read `prefers-reduced-motion` for elements observed from now on.
    #[wasm_bindgen(js_name = refresh_motion)]
    pub fn refresh_motion(&mut self) {
        let reduced = self.motion.prefers_reduced_motion();
        self.core.set_reduced_motion(reduced);
    }

    /// Decide the hero intro for this load: "play" or "skip".
    #[wasm_bindgen(js_name = resolve_hero)]
    pub fn resolve_hero(&mut self) -> String {
        decision_str(self.hero.resolve(&self.motion)).to_string()
    }

    /// "placeholder" until resolved, then "static" or "animated".
    #[wasm_bindgen(js_name = hero_presentation)]
    pub fn hero_presentation(&self) -> String {
        presentation_str(self.hero.presentation()).to_string()
    }

    #[wasm_bindgen(js_name = replay_hero)]
    pub fn replay_hero(&mut self) -> String {
        decision_str(self.hero.replay()).to_string()
    }

    #[wasm_bindgen(js_name = reset_hero)]
    pub fn reset_hero(&mut self) {
        self.hero.reset();
    }

    #[wasm_bindgen(js_name = skip_next_hero)]
    pub fn skip_next_hero(&mut self) {
        self.hero.skip_next();
    }

    #[wasm_bindgen(js_name = hero_played)]
    pub fn hero_played(&self) -> bool {
        self.hero.has_played()
    }

    /// `--hero-*` custom properties as a plain object.
    #[wasm_bindgen(js_name = hero_css_variables)]
    pub fn hero_css_variables(&self) -> Result<JsValue, JsError> {
        let obj = Object::new();
        for (name, value) in self.hero.config().timeline.css_variables() {
            Reflect::set(&obj, &JsValue::from_str(&name), &JsValue::from_str(&value))
                .map_err(|e| JsError::new(&format!("hero_css_variables error: {e:?}")))?;
        }
        Ok(obj.into())
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
