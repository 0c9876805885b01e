//! Fragments: partial component descriptions.
//!
//! A [`Fragment`] is an ordered mapping from symbolic names to [`Field`]s.
//! Both mixins and a component's own description are fragments. The names
//! carry meaning once fragments are flattened:
//!
//! | name                                   | role                        |
//! |----------------------------------------|-----------------------------|
//! | `attrs`                                | attribute specs, merged     |
//! | `styles`                               | stylesheet text, collected  |
//! | `render`                               | template producer           |
//! | `onInit` `onMount` `onUnmount` `onAdopted` | lifecycle hooks, aggregated |
//! | `on<event>` (lowercase after `on`)     | event handler, overridden   |
//! | anything else                          | method or data, overridden  |

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use super::instance::Component;
use crate::dom::Event;
use crate::error::{BlissError, ConfigurationError, Result};
use crate::render::Template;
use crate::value::Value;

/// A callable field. Receives the instance it is invoked on.
pub type Function = Arc<dyn Fn(&Component, Args<'_>) -> Result<Value> + Send + Sync>;

/// Produces the template for an instance.
pub type RenderFn = Arc<dyn Fn(&Component) -> Template + Send + Sync>;

static NULL: Value = Value::Null;

/// Arguments passed to a [`Function`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Args<'a> {
    event: Option<&'a Event>,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn values(values: &'a [Value]) -> Self {
        Self {
            event: None,
            values,
        }
    }

    pub fn event(event: &'a Event) -> Self {
        Self {
            event: Some(event),
            values: &[],
        }
    }

    /// The event being dispatched, for handlers.
    pub fn dispatched(&self) -> Option<&'a Event> {
        self.event
    }

    pub fn all(&self) -> &'a [Value] {
        self.values
    }

    /// Positional argument, `Null` when missing.
    pub fn get(&self, index: usize) -> &'a Value {
        self.values.get(index).unwrap_or(&NULL)
    }
}

/// Declared type of an attribute-backed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AttrType {
    /// No declared type; coerced like `String`.
    #[default]
    Any,
    String,
    Number,
    Boolean,
    #[serde(alias = "Array")]
    List,
    Object,
    Function,
}

fn default_reflect() -> bool {
    true
}

/// Declaration of one attribute-backed state property.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttrSpec {
    #[serde(rename = "type", default)]
    pub ty: AttrType,
    /// Initial state value.
    #[serde(default)]
    pub default: Value,
    /// DOM attribute name; the kebab-case property name when absent.
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default = "default_reflect")]
    pub reflect: bool,
}

impl AttrSpec {
    pub fn new(ty: AttrType) -> Self {
        Self {
            ty,
            default: Value::Null,
            attribute: None,
            reflect: true,
        }
    }

    pub fn any() -> Self {
        Self::new(AttrType::Any)
    }

    pub fn string() -> Self {
        Self::new(AttrType::String)
    }

    pub fn number() -> Self {
        Self::new(AttrType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(AttrType::Boolean)
    }

    pub fn list() -> Self {
        Self::new(AttrType::List)
    }

    pub fn object() -> Self {
        Self::new(AttrType::Object)
    }

    pub fn function() -> Self {
        Self::new(AttrType::Function)
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(name.into());
        self
    }

    pub fn reflect(mut self, reflect: bool) -> Self {
        self.reflect = reflect;
        self
    }

    /// Decode a spec given as data, e.g. `{"type": "Number", "default": 0}`.
    pub fn from_value(name: &str, value: &Value) -> Result<Self, ConfigurationError> {
        let json = serde_json::to_value(value).map_err(|err| ConfigurationError::InvalidAttrSpec {
            name: name.to_owned(),
            reason: err.to_string(),
        })?;
        serde_json::from_value(json).map_err(|err| ConfigurationError::InvalidAttrSpec {
            name: name.to_owned(),
            reason: err.to_string(),
        })
    }
}

/// One named entry of a fragment.
#[derive(Clone)]
pub enum Field {
    Attrs(IndexMap<String, AttrSpec>),
    Styles(Vec<String>),
    Render(RenderFn),
    Function(Function),
    Data(Value),
}

impl Field {
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Field::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Field::Data(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Attrs(attrs) => f.debug_tuple("Attrs").field(attrs).finish(),
            Field::Styles(styles) => f.debug_tuple("Styles").field(styles).finish(),
            Field::Render(_) => f.write_str("Render(..)"),
            Field::Function(_) => f.write_str("Function(..)"),
            Field::Data(value) => f.debug_tuple("Data").field(value).finish(),
        }
    }
}

/// A partial component description.
#[derive(Clone, Default, Debug)]
pub struct Fragment {
    fields: IndexMap<String, Field>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw field, replacing any previous field of that name.
    pub fn set(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Declare an attribute-backed property.
    pub fn attr(mut self, property: impl Into<String>, spec: AttrSpec) -> Self {
        let property = property.into();
        match self.fields.get_mut("attrs") {
            Some(Field::Attrs(attrs)) => {
                attrs.insert(property, spec);
            }
            _ => {
                self.fields
                    .insert("attrs".to_owned(), Field::Attrs(IndexMap::from([(property, spec)])));
            }
        }
        self
    }

    /// Append stylesheet text. Texts of one fragment form one stylesheet.
    pub fn styles(mut self, css: impl Into<String>) -> Self {
        let css = css.into();
        match self.fields.get_mut("styles") {
            Some(Field::Styles(styles)) => styles.push(css),
            _ => {
                self.fields.insert("styles".to_owned(), Field::Styles(vec![css]));
            }
        }
        self
    }

    pub fn render<F>(self, render: F) -> Self
    where
        F: Fn(&Component) -> Template + Send + Sync + 'static,
    {
        self.set("render", Field::Render(Arc::new(render)))
    }

    /// A method returning a value.
    pub fn method<F>(self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Component, Args<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.set(name, Field::Function(Arc::new(method)))
    }

    /// A hook taking no arguments, such as `onMount`.
    pub fn hook<F>(self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Component) -> Result<()> + Send + Sync + 'static,
    {
        self.method(name, move |this, _| hook(this).map(|()| Value::Null))
    }

    pub fn on_init<F>(self, hook: F) -> Self
    where
        F: Fn(&Component) -> Result<()> + Send + Sync + 'static,
    {
        self.hook("onInit", hook)
    }

    pub fn on_mount<F>(self, hook: F) -> Self
    where
        F: Fn(&Component) -> Result<()> + Send + Sync + 'static,
    {
        self.hook("onMount", hook)
    }

    pub fn on_unmount<F>(self, hook: F) -> Self
    where
        F: Fn(&Component) -> Result<()> + Send + Sync + 'static,
    {
        self.hook("onUnmount", hook)
    }

    pub fn on_adopted<F>(self, hook: F) -> Self
    where
        F: Fn(&Component) -> Result<()> + Send + Sync + 'static,
    {
        self.hook("onAdopted", hook)
    }

    /// An event handler stored under `name`, e.g. `onclick`.
    pub fn handler<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Component, &Event) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        self.method(name, move |this, args| match args.dispatched() {
            Some(event) => handler(this, event).map(|()| Value::Null),
            None => Err(BlissError::hook(format!("`{label}` must be invoked with an event"))),
        })
    }

    /// A plain data field.
    pub fn data(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, Field::Data(value.into()))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
