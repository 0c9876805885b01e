//! Bliss Core
//!
//! Declarative, mixin-composed custom elements. A component is described by
//! plain [`Fragment`](component::Fragment)s: attributes, styles, a render
//! function, lifecycle hooks, event handlers and methods. Defining the
//! component flattens its fragments once into a shared type; every element
//! created for the tag then gets:
//!
//! - reactive `state`, two-way synchronized with its observed attributes;
//! - a render watcher redrawing its shadow root when tracked state changes;
//! - aggregated lifecycle hooks and overridden event handlers;
//! - ancestor context lookup by selector.
//!
//! # Architecture
//!
//! - `component`: fragments, flattening, lifecycle aggregation, attribute
//!   sync and component instances
//! - `registry`: tag name → component type, insert-once
//! - `dom`: the host element tree and its native lifecycle points
//! - `reactive`: the observable collaborator (stores and watchers)
//! - `render`: templates, stylesheets and the render collaborator
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bliss_core::{html, AttrSpec, DefineOptions, Document, Fragment, Registry};
//!
//! let registry = Arc::new(Registry::new());
//! registry.define(
//!     "x-greeting",
//!     Fragment::new()
//!         .attr("name", AttrSpec::string().with_default("world"))
//!         .render(|this| html!["<p>Hello ", this.state().get("name"), "</p>"]),
//!     DefineOptions::new(),
//! )?;
//!
//! let doc = Document::new(registry);
//! let greeting = doc.create_element("x-greeting")?;
//! doc.body().append_child(&greeting)?;
//!
//! greeting.set_attribute("name", "bliss")?;
//! assert_eq!(greeting.shadow_root().unwrap().markup(), "<p>Hello bliss</p>");
//! ```

pub mod component;
pub mod dom;
pub mod error;
pub mod reactive;
pub mod registry;
pub mod render;
pub mod value;

pub use component::{AttrSpec, AttrType, Component, DefineOptions, Fragment};
pub use dom::{Document, Event, Node};
pub use error::{BlissError, ConfigurationError, Result};
pub use registry::Registry;
pub use render::{Template, StyleSheet};
pub use value::Value;
