//! Browser implementations of the core's host seams.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Storage,
};

use vizij_reveal_core::{
    ElementId, IntersectionEntry, MotionPreference, SessionStore, SourceError, StoreError,
    VisibilitySource,
};

/// Attribute carrying the engine id on observed nodes.
pub const ID_ATTR: &str = "data-reveal-id";

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type Queue = Rc<RefCell<Vec<IntersectionEntry>>>;

struct Observer {
    inner: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

/// `IntersectionObserver`-backed visibility source.
///
/// One observer is shared per distinct threshold. Entries are queued by the
/// observer callback and handed to the engine on the next `drain`.
pub struct DomVisibility {
    supported: bool,
    queue: Queue,
    listener: Rc<RefCell<Option<Function>>>,
    observers: HashMap<u32, Observer>,
    nodes: HashMap<ElementId, (Element, Option<u32>)>,
}

impl DomVisibility {
    pub fn new() -> Self {
        let supported = web_sys::window()
            .map(|w| Reflect::has(&w, &JsValue::from_str("IntersectionObserver")).unwrap_or(false))
            .unwrap_or(false);
        if !supported {
            log::warn!("IntersectionObserver unavailable; content will be shown immediately");
        }
        Self {
            supported,
            queue: Rc::new(RefCell::new(Vec::new())),
            listener: Rc::new(RefCell::new(None)),
            observers: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    /// Associate `element` with `id` ahead of `observe`.
    pub fn bind(&mut self, id: ElementId, element: Element) {
        if let Err(err) = element.set_attribute(ID_ATTR, &id.0.to_string()) {
            log::warn!("could not tag element {id}: {err:?}");
        }
        self.nodes.insert(id, (element, None));
    }

    /// Forget the node bound to `id`, stopping observation first.
    pub fn unbind(&mut self, id: ElementId) {
        self.unobserve(id);
        if let Some((element, _)) = self.nodes.remove(&id) {
            if let Err(err) = element.remove_attribute(ID_ATTR) {
                log::warn!("could not untag element {id}: {err:?}");
            }
        }
    }

    /// Id already bound to this exact node, if any.
    pub fn bound_id(&self, element: &Element) -> Option<ElementId> {
        let id = ElementId(element.get_attribute(ID_ATTR)?.parse::<u32>().ok()?);
        match self.nodes.get(&id) {
            Some((node, _)) if node == element => Some(id),
            _ => None,
        }
    }

    /// Called (with no arguments) whenever new entries were queued.
    pub fn set_listener(&mut self, listener: Option<Function>) {
        *self.listener.borrow_mut() = listener;
    }

    fn observer_for(&mut self, threshold: f32) -> Result<&IntersectionObserver, SourceError> {
        let key = threshold.to_bits();
        if !self.observers.contains_key(&key) {
            let queue = Rc::clone(&self.queue);
            let listener = Rc::clone(&self.listener);
            let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
                move |entries: Array, _observer: IntersectionObserver| {
                    {
                        let mut queue = queue.borrow_mut();
                        for entry in entries.iter() {
                            let entry: IntersectionObserverEntry = entry.unchecked_into();
                            let Some(id) = entry
                                .target()
                                .get_attribute(ID_ATTR)
                                .and_then(|raw| raw.parse::<u32>().ok())
                            else {
                                continue;
                            };
                            queue.push(IntersectionEntry::new(
                                ElementId(id),
                                entry.is_intersecting(),
                                entry.intersection_ratio(),
                            ));
                        }
                    }
                    // Clone out so the listener may re-enter set_listener.
                    let listener = listener.borrow().clone();
                    if let Some(f) = listener {
                        if let Err(err) = f.call0(&JsValue::UNDEFINED) {
                            log::error!("reveal listener threw: {err:?}");
                        }
                    }
                },
            );
            let init = IntersectionObserverInit::new();
            init.set_threshold(&JsValue::from_f64(threshold as f64));
            let inner =
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                    .map_err(|e| SourceError::Backend(format!("{e:?}")))?;
            self.observers.insert(
                key,
                Observer {
                    inner,
                    _callback: callback,
                },
            );
        }
        self.observers
            .get(&key)
            .map(|o| &o.inner)
            .ok_or_else(|| SourceError::Backend("observer missing".into()))
    }
}

impl Default for DomVisibility {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilitySource for DomVisibility {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn observe(&mut self, element: ElementId, threshold: f32) -> Result<(), SourceError> {
        if !self.supported {
            return Err(SourceError::Unsupported);
        }
        let node = self
            .nodes
            .get(&element)
            .map(|(node, _)| node.clone())
            .ok_or_else(|| SourceError::Backend(format!("no node bound to {element}")))?;
        self.observer_for(threshold)?.observe(&node);
        if let Some((_, key)) = self.nodes.get_mut(&element) {
            *key = Some(threshold.to_bits());
        }
        Ok(())
    }

    fn unobserve(&mut self, element: ElementId) {
        let Some((node, key)) = self.nodes.get_mut(&element) else {
            return;
        };
        if let Some(observer) = key.take().and_then(|k| self.observers.get(&k)) {
            observer.inner.unobserve(node);
        }
    }

    fn drain(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

impl Drop for DomVisibility {
    fn drop(&mut self) {
        for observer in self.observers.values() {
            observer.inner.disconnect();
        }
    }
}

/// `window.sessionStorage`. Missing storage surfaces as
/// [`StoreError::Unavailable`] so the hero gate can degrade.
pub struct SessionStorageStore {
    storage: Option<Storage>,
}

impl SessionStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.session_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("sessionStorage unavailable");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage.as_ref().ok_or(StoreError::Unavailable)
    }
}

impl Default for SessionStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

fn backend(err: JsValue) -> StoreError {
    StoreError::Backend(format!("{err:?}"))
}

impl SessionStore for SessionStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?.get_item(key).map_err(backend)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?.set_item(key, value).map_err(backend)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage()?.remove_item(key).map_err(backend)
    }
}

/// `prefers-reduced-motion` via `matchMedia`, read on each query.
#[derive(Default, Clone, Copy)]
pub struct DomMotion;

impl MotionPreference for DomMotion {
    fn prefers_reduced_motion(&self) -> bool {
        web_sys::window()
            .and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
            .map(|mql| mql.matches())
            .unwrap_or(false)
    }
}
