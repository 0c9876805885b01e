//! Component instances.
//!
//! A [`Component`] is the per-element half of a defined tag. It owns the
//! reactive state, the reflection and render watchers, and the render
//! boundary, and it receives the native lifecycle points from its
//! [`Node`].
//!
//! # Ownership
//!
//! The node owns its component; the component only holds a weak handle
//! back. Watchers and listeners capture a [`WeakComponent`], so dropping the
//! element drops the whole instance and unregisters its watchers.
//!
//! # Construction order
//!
//! 1. bind one dispatch listener per handled event type;
//! 2. initialize state from the attribute defaults;
//! 3. register one reflection watcher per reflected attribute;
//! 4. run the `onInit` hooks;
//! 5. establish the render target;
//! 6. register the render watcher.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use super::definition::ComponentType;
use super::events;
use super::fragment::{Args, Field};
use super::lifecycle::Lifecycle;
use super::schema::AttrBinding;
use super::sync::{self, Reflection};
use crate::dom::{Event, ListenerId, Node, Selector, ShadowRoot, WeakNode};
use crate::error::{BlissError, Result};
use crate::reactive::{untrack, Effect, Store};
use crate::render::RenderTarget;
use crate::value::Value;

/// Where the render watcher draws.
enum Boundary {
    Shadow(ShadowRoot),
    /// The element itself.
    Host,
}

struct ComponentInner {
    ty: Arc<ComponentType>,
    node: WeakNode,
    state: Store,
    boundary: RwLock<Option<Boundary>>,
    watchers: Mutex<Vec<Effect>>,
    /// Attributes currently being written by reflection.
    reflecting: Mutex<HashSet<String>>,
    torn_down: AtomicBool,
}

/// A live instance of a defined tag.
#[derive(Clone)]
pub struct Component {
    inner: Arc<ComponentInner>,
}

/// Non-owning handle to a [`Component`].
#[derive(Clone)]
pub struct WeakComponent {
    inner: Weak<ComponentInner>,
}

impl WeakComponent {
    pub fn upgrade(&self) -> Option<Component> {
        self.inner.upgrade().map(|inner| Component { inner })
    }
}

impl Component {
    /// Upgrade `node` into an instance of `ty`.
    pub(crate) fn construct(ty: Arc<ComponentType>, node: &Node) -> Result<Component> {
        let state: IndexMap<String, Value> = ty
            .schema()
            .bindings()
            .iter()
            .map(|binding| (binding.property.clone(), binding.initial_value()))
            .collect();

        let component = Component {
            inner: Arc::new(ComponentInner {
                ty,
                node: node.downgrade(),
                state: Store::from_map(state),
                boundary: RwLock::new(None),
                watchers: Mutex::new(Vec::new()),
                reflecting: Mutex::new(HashSet::new()),
                torn_down: AtomicBool::new(false),
            }),
        };
        node.set_component(Some(component.clone()));
        debug!(tag = component.tag_name(), is = ?node.is_value(), "constructing component");

        component.bind_events(node);
        component.watch_reflections();
        component.inner.ty.lifecycle().run(Lifecycle::Init, &component)?;
        component.establish_boundary(node);
        component.watch_render();

        Ok(component)
    }

    fn bind_events(&self, node: &Node) {
        for kind in self.inner.ty.event_types() {
            let weak = self.downgrade();
            node.add_event_listener(kind, move |event| match weak.upgrade() {
                Some(component) => component.handle_event(event),
                None => Ok(()),
            });
        }
    }

    fn push_watcher(&self, watcher: Effect) {
        self.inner.watchers.lock().push(watcher);
    }

    fn watch_reflections(&self) {
        let reflected: Vec<AttrBinding> = self
            .inner
            .ty
            .schema()
            .bindings()
            .iter()
            .filter(|binding| binding.is_reflected())
            .cloned()
            .collect();

        for binding in reflected {
            let weak = self.downgrade();
            let watcher = Effect::new(move || {
                let Some(this) = weak.upgrade() else {
                    return;
                };
                let value = this.inner.state.get(&binding.property);
                let reflection = sync::reflect(binding.spec.ty, &value);
                if let Err(err) = this.reflect_attribute(&binding.attribute, reflection) {
                    warn!(tag = this.tag_name(), attribute = %binding.attribute, %err, "reflection failed");
                }
            });
            self.push_watcher(watcher);
        }
    }

    fn establish_boundary(&self, node: &Node) {
        let light_dom = self
            .inner
            .ty
            .description()
            .data("hasShadowRoot")
            .is_some_and(|value| !value.is_null());

        let boundary = if light_dom {
            if !self.inner.ty.stylesheets().is_empty() {
                warn!(
                    tag = self.tag_name(),
                    stylesheets = self.inner.ty.stylesheets().len(),
                    "rendering into the element itself, stylesheets are not attached"
                );
            }
            Boundary::Host
        } else {
            let root = node.attach_shadow();
            root.set_adopted_stylesheets(self.inner.ty.stylesheets().to_vec());
            Boundary::Shadow(root)
        };
        *self.inner.boundary.write() = Some(boundary);
    }

    fn watch_render(&self) {
        let weak = self.downgrade();
        let watcher = Effect::new(move || {
            let Some(this) = weak.upgrade() else {
                return;
            };
            let (Some(target), Some(render)) =
                (this.render_target(), this.inner.ty.description().render_fn())
            else {
                return;
            };
            let template = render(&this);
            untrack(|| this.inner.ty.renderer().render(&target, &template));
        });
        self.push_watcher(watcher);
    }

    /// Write a reflected value without feeding it back through coercion.
    fn reflect_attribute(&self, attribute: &str, reflection: Reflection) -> Result<()> {
        let node = self.node()?;
        let current = node.get_attribute(attribute);
        let unchanged = match &reflection {
            Reflection::Remove => current.is_none(),
            Reflection::Set(value) => current.as_deref() == Some(value.as_str()),
        };
        if unchanged {
            return Ok(());
        }

        trace!(tag = self.tag_name(), attribute, ?reflection, "reflecting state");
        self.inner.reflecting.lock().insert(attribute.to_owned());
        let outcome = untrack(|| match reflection {
            Reflection::Remove => node.remove_attribute(attribute),
            Reflection::Set(value) => node.set_attribute(attribute, value),
        });
        self.inner.reflecting.lock().remove(attribute);
        outcome
    }

    fn teardown(&self) {
        self.inner.torn_down.store(true, Ordering::SeqCst);
        let watchers = std::mem::take(&mut *self.inner.watchers.lock());
        for watcher in &watchers {
            watcher.dispose();
        }
        debug!(tag = self.tag_name(), watchers = watchers.len(), "component torn down");
    }

    // ------------------------------------------------------------------
    // Native callbacks
    // ------------------------------------------------------------------

    /// Whether mutations of `attribute` are reported to this instance.
    pub fn observes(&self, attribute: &str) -> bool {
        self.inner.ty.schema().by_attribute(attribute).is_some()
    }

    /// Inbound sync: coerce the new attribute value into state.
    pub fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>) -> Result<()> {
        let reflecting = self.inner.reflecting.lock().contains(name);
        if reflecting {
            return Ok(());
        }
        let Some(binding) = self.inner.ty.schema().by_attribute(name) else {
            return Ok(());
        };

        let value = sync::coerce(binding.spec.ty, new);
        trace!(tag = self.tag_name(), attribute = name, ?old, ?new, %value, "attribute changed");
        self.inner.state.set(&binding.property, value);
        Ok(())
    }

    /// Runs the `onMount` hooks. A torn-down instance gets its reflection
    /// and render watchers back first.
    pub fn connected(&self) -> Result<()> {
        if self.inner.torn_down.swap(false, Ordering::SeqCst) {
            debug!(tag = self.tag_name(), "reviving component");
            self.watch_reflections();
            self.watch_render();
        }
        self.inner.ty.lifecycle().run(Lifecycle::Mount, self)
    }

    /// Runs the `onUnmount` hooks, then disposes every watcher. Watchers are
    /// disposed even when a hook fails.
    pub fn disconnected(&self) -> Result<()> {
        let outcome = self.inner.ty.lifecycle().run(Lifecycle::Unmount, self);
        self.teardown();
        outcome
    }

    pub fn adopted(&self) -> Result<()> {
        self.inner.ty.lifecycle().run(Lifecycle::Adopted, self)
    }

    /// Route a dispatched event to the `on<type>` handler.
    pub fn handle_event(&self, event: &Event) -> Result<()> {
        let name = events::handler_name(event.kind());
        match self.inner.ty.description().function(&name) {
            Some(handler) => untrack(|| handler(self, Args::event(event))).map(drop),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Instance API
    // ------------------------------------------------------------------

    /// The nearest ancestor component whose element matches `selector`.
    ///
    /// Walks up from the parent on every call.
    pub fn get_context(&self, selector: &str) -> Result<Component> {
        let parsed = Selector::parse(selector)?;
        let mut current = self.node()?.parent();
        while let Some(ancestor) = current {
            if let Some(component) = ancestor.component() {
                if parsed.matches(&ancestor) {
                    return Ok(component);
                }
            }
            current = ancestor.parent();
        }
        Err(BlissError::Lookup {
            tag: self.tag_name().to_owned(),
            selector: selector.to_owned(),
        })
    }

    pub fn state(&self) -> &Store {
        &self.inner.state
    }

    /// The element this instance is upgraded onto.
    pub fn node(&self) -> Result<Node> {
        self.inner
            .node
            .upgrade()
            .ok_or_else(|| BlissError::Detached(self.tag_name().to_owned()))
    }

    pub fn tag_name(&self) -> &str {
        self.inner.ty.name()
    }

    pub fn component_type(&self) -> &Arc<ComponentType> {
        &self.inner.ty
    }

    /// A field of the flattened description.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.inner.ty.description().get(name)
    }

    /// Invoke a method of the flattened description.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let method = self.inner.ty.description().function(name).ok_or_else(|| {
            BlissError::UnknownMethod {
                tag: self.tag_name().to_owned(),
                name: name.to_owned(),
            }
        })?;
        method(self, Args::values(args))
    }

    /// Watch tracked reads made by `f`. The watcher lives until teardown.
    pub fn observe<F>(&self, f: F) -> Effect
    where
        F: Fn(&Component) + Send + Sync + 'static,
    {
        let weak = self.downgrade();
        let watcher = Effect::new(move || {
            if let Some(this) = weak.upgrade() {
                f(&this);
            }
        });
        self.push_watcher(watcher.clone());
        watcher
    }

    /// `None` until construction has established the boundary.
    pub fn render_target(&self) -> Option<RenderTarget> {
        match self.inner.boundary.read().as_ref()? {
            Boundary::Shadow(root) => Some(RenderTarget::Shadow(root.clone())),
            Boundary::Host => self.inner.node.upgrade().map(RenderTarget::Host),
        }
    }

    pub fn click(&self) -> Result<()> {
        self.node()?.click()
    }

    pub fn add_event_listener<F>(&self, kind: &str, listener: F) -> Result<ListenerId>
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        Ok(self.node()?.add_event_listener(kind, listener))
    }

    /// Whether the instance was disconnected and not reconnected since.
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    /// Number of live watchers owned by the instance.
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.lock().len()
    }

    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("tag", &self.tag_name())
            .field("state", &self.inner.state)
            .field("watchers", &self.watcher_count())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}
