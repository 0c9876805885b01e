//! Keyed reactive store.
//!
//! A `Store` wraps a plain mapping of names to [`Value`]s so that every key
//! behaves like its own signal: a watcher that reads `foo` re-runs when
//! `foo` changes and is unaffected by writes to `bar`. Reading a key that
//! was never written yields `Value::Null` and still subscribes, so a later
//! first write reaches the reader.
//!
//! Writes that store an equal value do not notify.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::signal::Signal;
use crate::value::Value;

/// A reactive mapping from keys to values. Clones share state.
#[derive(Clone, Default)]
pub struct Store {
    slots: Arc<RwLock<IndexMap<String, Signal<Value>>>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing mapping.
    pub fn from_map(initial: IndexMap<String, Value>) -> Self {
        let slots = initial
            .into_iter()
            .map(|(key, value)| (key, Signal::new(value)))
            .collect();
        Self {
            slots: Arc::new(RwLock::new(slots)),
        }
    }

    fn slot(&self, key: &str) -> Signal<Value> {
        if let Some(signal) = self.slots.read().get(key) {
            return signal.clone();
        }
        self.slots
            .write()
            .entry(key.to_owned())
            .or_insert_with(|| Signal::new(Value::Null))
            .clone()
    }

    /// Read a key, tracking the dependency.
    pub fn get(&self, key: &str) -> Value {
        self.slot(key).get()
    }

    /// Read a key without tracking.
    pub fn get_untracked(&self, key: &str) -> Value {
        self.slots
            .read()
            .get(key)
            .map(Signal::get_untracked)
            .unwrap_or_default()
    }

    /// Write a key. Returns whether the stored value changed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        self.slot(key).replace_by(value.into(), Value::same_as)
    }

    /// Read-modify-write a key.
    pub fn update(&self, key: &str, f: impl FnOnce(&Value) -> Value) -> bool {
        let slot = self.slot(key);
        let next = f(&slot.get_untracked());
        slot.replace_by(next, Value::same_as)
    }

    /// Whether the key has ever been read or written.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.read().contains_key(key)
    }

    /// Keys in first-use order.
    pub fn keys(&self) -> Vec<String> {
        self.slots.read().keys().cloned().collect()
    }

    /// Untracked copy of the current contents.
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.slots
            .read()
            .iter()
            .map(|(key, signal)| (key.clone(), signal.get_untracked()))
            .collect()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}
