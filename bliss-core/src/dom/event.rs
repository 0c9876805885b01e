//! Events dispatched through the element tree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Node;
use crate::error::Result;
use crate::value::Value;

/// Callback registered with [`Node::add_event_listener`].
pub type Listener = Arc<dyn Fn(&Event) -> Result<()> + Send + Sync>;

/// Identifies a registered listener so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A native-style event.
#[derive(Debug)]
pub struct Event {
    kind: String,
    bubbles: bool,
    key: Option<String>,
    detail: Value,
    pub(crate) target: Option<Node>,
    pub(crate) current_target: Option<Node>,
    stopped: AtomicBool,
}

impl Event {
    /// A non-bubbling event of the given type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            bubbles: false,
            key: None,
            detail: Value::Null,
            target: None,
            current_target: None,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn bubbling(mut self) -> Self {
        self.bubbles = true;
        self
    }

    /// Attach a key name, as carried by keyboard events.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = detail.into();
        self
    }

    /// The event type, e.g. `click`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> Option<&Node> {
        self.target.as_ref()
    }

    /// The node whose listeners are currently running.
    pub fn current_target(&self) -> Option<&Node> {
        self.current_target.as_ref()
    }

    /// Stop the event from reaching further ancestors.
    pub fn stop_propagation(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
