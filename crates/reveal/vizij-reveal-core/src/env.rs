//! Host environment seams: session store, motion preference and frame clock.
//!
//! Adapters (wasm, tests) implement these; the core only reads them.

use std::cell::Cell;

use hashbrown::HashMap;

use crate::error::StoreError;

/// Session-scoped string key-value store (the browser's `sessionStorage`).
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store. One instance models one browsing session.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Store that fails every call, e.g. storage disabled by privacy settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }
    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// The user agent's reduced-motion preference.
pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

impl MotionPreference for bool {
    fn prefers_reduced_motion(&self) -> bool {
        *self
    }
}

/// Per-frame timestamp source in milliseconds (the rAF timestamp in browsers).
pub trait FrameClock {
    fn now_ms(&self) -> f64;
}

/// Clock advanced by hand; tests feed synthetic timestamps through it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, dt_ms: f64) {
        self.now.set(self.now.get() + dt_ms);
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
