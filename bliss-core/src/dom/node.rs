//! Element nodes.
//!
//! A [`Node`] is a cheap handle to a shared element. Parents own their
//! children; children point back through weak references. A node created
//! for a defined tag carries its [`Component`], and the node forwards the
//! native lifecycle points to it:
//!
//! - becoming connected (inserted under a connected parent);
//! - becoming disconnected (removed from a connected parent);
//! - adoption into another document;
//! - mutation of an observed attribute, reported as `(name, old, new)`.
//!
//! No lock is held while a callback or listener runs, so callbacks may
//! freely mutate the tree.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::warn;

use super::event::{Event, Listener, ListenerId};
use super::selector::Selector;
use crate::component::Component;
use crate::error::{BlissError, Result};
use crate::render::StyleSheet;

static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

struct NodeInner {
    local_name: String,
    is: Option<String>,
    owner: AtomicU64,
    attributes: RwLock<IndexMap<String, String>>,
    parent: RwLock<Weak<NodeInner>>,
    children: RwLock<Vec<Node>>,
    connected: AtomicBool,
    shadow: RwLock<Option<ShadowRoot>>,
    markup: RwLock<String>,
    listeners: RwLock<Vec<(ListenerId, String, Listener)>>,
    component: RwLock<Option<Component>>,
}

/// Handle to an element in a document tree.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

/// Non-owning handle to a [`Node`].
#[derive(Clone, Default)]
pub struct WeakNode {
    inner: Weak<NodeInner>,
}

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.inner.upgrade().map(|inner| Node { inner })
    }
}

impl Node {
    pub(crate) fn new(local_name: &str, is: Option<&str>, owner: u64) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                local_name: local_name.to_ascii_lowercase(),
                is: is.map(str::to_owned),
                owner: AtomicU64::new(owner),
                attributes: RwLock::new(IndexMap::new()),
                parent: RwLock::new(Weak::new()),
                children: RwLock::new(Vec::new()),
                connected: AtomicBool::new(false),
                shadow: RwLock::new(None),
                markup: RwLock::new(String::new()),
                listeners: RwLock::new(Vec::new()),
                component: RwLock::new(None),
            }),
        }
    }

    pub(crate) fn mark_connected(&self) {
        self.inner.connected.store(true, Ordering::SeqCst);
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Lowercase element name, e.g. `aha-tab` or `button`.
    pub fn local_name(&self) -> &str {
        &self.inner.local_name
    }

    /// The custom element name of a customized built-in.
    pub fn is_value(&self) -> Option<&str> {
        self.inner.is.as_deref()
    }

    pub(crate) fn owner_document(&self) -> u64 {
        self.inner.owner.load(Ordering::SeqCst)
    }

    pub(crate) fn set_owner_document(&self, owner: u64) {
        self.inner.owner.store(owner, Ordering::SeqCst);
    }

    /// The component upgraded onto this element, if any.
    pub fn component(&self) -> Option<Component> {
        self.inner.component.read().clone()
    }

    pub(crate) fn set_component(&self, component: Option<Component>) {
        *self.inner.component.write() = component;
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.inner
            .attributes
            .read()
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner
            .attributes
            .read()
            .contains_key(&name.to_ascii_lowercase())
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.inner.attributes.read().keys().cloned().collect()
    }

    /// Set an attribute and notify the component if it observes `name`.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let old = self.inner.attributes.write().insert(name.clone(), value.clone());
        self.attribute_changed(&name, old.as_deref(), Some(&value))
    }

    /// Remove an attribute, notifying the component if it was present.
    pub fn remove_attribute(&self, name: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old = self.inner.attributes.write().shift_remove(&name);
        match old {
            Some(old) => self.attribute_changed(&name, Some(&old), None),
            None => Ok(()),
        }
    }

    /// Add the attribute if absent, remove it if present. Returns presence.
    pub fn toggle_attribute(&self, name: &str) -> Result<bool> {
        if self.has_attribute(name) {
            self.remove_attribute(name)?;
            Ok(false)
        } else {
            self.set_attribute(name, "")?;
            Ok(true)
        }
    }

    fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>) -> Result<()> {
        match self.component() {
            Some(component) if component.observes(name) => {
                component.attribute_changed(name, old, new)
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    pub fn parent(&self) -> Option<Node> {
        self.inner.parent.read().upgrade().map(|inner| Node { inner })
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.children.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn is_inclusive_ancestor_of(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Append `child`, moving it from its current parent first.
    ///
    /// Connecting a subtree fires `connected` for every component in it, in
    /// tree order. Every callback runs and the move always completes; the
    /// first failure is returned.
    pub fn append_child(&self, child: &Node) -> Result<()> {
        if child.is_inclusive_ancestor_of(self) {
            return Err(BlissError::HierarchyRequest {
                parent: self.local_name().to_owned(),
                child: child.local_name().to_owned(),
            });
        }
        // A failing unmount hook must not strand the child between parents.
        let detached = match child.parent() {
            Some(old_parent) => old_parent.remove_child(child),
            None => Ok(()),
        };

        *child.inner.parent.write() = Arc::downgrade(&self.inner);
        self.inner.children.write().push(child.clone());

        let attached = if self.is_connected() {
            child.set_connected(true)
        } else {
            Ok(())
        };
        detached.and(attached)
    }

    /// Remove a direct child. Disconnecting fires `disconnected` for every
    /// component in the subtree, in tree order.
    pub fn remove_child(&self, child: &Node) -> Result<()> {
        let removed = {
            let mut children = self.inner.children.write();
            let index = children.iter().position(|c| c.ptr_eq(child));
            index.map(|index| children.remove(index))
        };
        let Some(removed) = removed else {
            return Err(BlissError::HierarchyRequest {
                parent: self.local_name().to_owned(),
                child: child.local_name().to_owned(),
            });
        };

        *removed.inner.parent.write() = Weak::new();
        if removed.is_connected() {
            removed.set_connected(false)
        } else {
            Ok(())
        }
    }

    /// Detach from the parent, if any.
    pub fn remove(&self) -> Result<()> {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => Ok(()),
        }
    }

    /// Nodes of the subtree rooted here, in tree order.
    pub fn descendants_inclusive(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    fn set_connected(&self, connected: bool) -> Result<()> {
        let subtree = self.descendants_inclusive();
        for node in &subtree {
            node.inner.connected.store(connected, Ordering::SeqCst);
        }

        let mut first_error = None;
        for node in subtree {
            let Some(component) = node.component() else {
                continue;
            };
            let outcome = if connected {
                component.connected()
            } else {
                component.disconnected()
            };
            if let Err(err) = outcome {
                warn!(tag = component.tag_name(), %err, connected, "lifecycle callback failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Elements below this node (excluding itself) matching `selector`.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants_inclusive()
            .into_iter()
            .skip(1)
            .filter(|node| selector.matches(node))
            .collect())
    }

    pub fn matches(&self, selector: &str) -> Result<bool> {
        Ok(Selector::parse(selector)?.matches(self))
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Create the element's isolated render root, or return the existing one.
    pub fn attach_shadow(&self) -> ShadowRoot {
        let mut shadow = self.inner.shadow.write();
        shadow
            .get_or_insert_with(|| ShadowRoot::new(self.downgrade()))
            .clone()
    }

    pub fn shadow_root(&self) -> Option<ShadowRoot> {
        self.inner.shadow.read().clone()
    }

    /// Light-DOM markup rendered into the element itself.
    pub fn markup(&self) -> String {
        self.inner.markup.read().clone()
    }

    pub(crate) fn replace_markup(&self, markup: String) -> bool {
        let mut current = self.inner.markup.write();
        if *current == markup {
            return false;
        }
        *current = markup;
        true
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener<F>(&self, kind: &str, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        let id = ListenerId(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .write()
            .push((id, kind.to_owned(), Arc::new(listener)));
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Event types this node has listeners for, in registration order.
    pub fn listened_event_types(&self) -> Vec<String> {
        let mut kinds: Vec<String> = Vec::new();
        for (_, kind, _) in self.inner.listeners.read().iter() {
            if !kinds.contains(kind) {
                kinds.push(kind.clone());
            }
        }
        kinds
    }

    /// Dispatch at this node, then bubble through ancestors if the event
    /// bubbles. A listener error aborts dispatch and is returned.
    pub fn dispatch_event(&self, mut event: Event) -> Result<()> {
        event.target = Some(self.clone());
        let mut current = Some(self.clone());

        while let Some(node) = current {
            let listeners: Vec<Listener> = node
                .inner
                .listeners
                .read()
                .iter()
                .filter(|(_, kind, _)| kind == event.kind())
                .map(|(_, _, listener)| Arc::clone(listener))
                .collect();

            event.current_target = Some(node.clone());
            for listener in listeners {
                listener(&event)?;
            }

            if !event.bubbles() || event.propagation_stopped() {
                break;
            }
            current = node.parent();
        }
        Ok(())
    }

    /// Dispatch a bubbling `click`.
    pub fn click(&self) -> Result<()> {
        self.dispatch_event(Event::new("click").bubbling())
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("local_name", &self.inner.local_name)
            .field("is", &self.inner.is)
            .field("attributes", &*self.inner.attributes.read())
            .field("connected", &self.is_connected())
            .finish()
    }
}

struct ShadowInner {
    host: WeakNode,
    markup: RwLock<String>,
    stylesheets: RwLock<Vec<Arc<StyleSheet>>>,
}

/// Isolated render root attached to an element.
#[derive(Clone)]
pub struct ShadowRoot {
    inner: Arc<ShadowInner>,
}

impl ShadowRoot {
    fn new(host: WeakNode) -> Self {
        Self {
            inner: Arc::new(ShadowInner {
                host,
                markup: RwLock::new(String::new()),
                stylesheets: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn host(&self) -> Option<Node> {
        self.inner.host.upgrade()
    }

    pub fn markup(&self) -> String {
        self.inner.markup.read().clone()
    }

    pub(crate) fn replace_markup(&self, markup: String) -> bool {
        let mut current = self.inner.markup.write();
        if *current == markup {
            return false;
        }
        *current = markup;
        true
    }

    pub fn adopted_stylesheets(&self) -> Vec<Arc<StyleSheet>> {
        self.inner.stylesheets.read().clone()
    }

    pub fn set_adopted_stylesheets(&self, sheets: Vec<Arc<StyleSheet>>) {
        *self.inner.stylesheets.write() = sheets;
    }

    pub fn ptr_eq(&self, other: &ShadowRoot) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ShadowRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowRoot")
            .field("markup", &*self.inner.markup.read())
            .field("stylesheets", &self.inner.stylesheets.read().len())
            .finish()
    }
}
