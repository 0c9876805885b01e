//! Component composition.
//!
//! A component is defined from an ordered list of [`Fragment`]s:
//!
//! ```text
//! [defaults, mixin_1, ..., mixin_n, own]
//! ```
//!
//! Definition flattens the list once into a [`ComponentType`] shared by
//! every instance of the tag. Fields override left to right, except
//! lifecycle hooks, which aggregate and all run in fragment order, and
//! `attrs`, which merge per attribute.
//!
//! # Example
//!
//! ```rust,ignore
//! let tabbable = Fragment::new()
//!     .attr("tabindex", AttrSpec::number().with_default(0))
//!     .on_mount(|this| this.node()?.set_attribute("role", "tab"));
//!
//! registry.define(
//!     "aha-tab",
//!     Fragment::new()
//!         .attr("active", AttrSpec::boolean())
//!         .render(|this| html!["<slot></slot>"]),
//!     DefineOptions::new().mixin(tabbable),
//! )?;
//! ```

mod definition;
mod events;
mod flatten;
mod fragment;
mod instance;
mod lifecycle;
mod schema;
mod sync;

pub use definition::{ComponentType, DefineOptions};
pub use events::{event_type, handler_name};
pub use flatten::{defaults, flatten, fragment_chain, FlattenedDescription};
pub use fragment::{Args, AttrSpec, AttrType, Field, Fragment, Function, RenderFn};
pub use instance::{Component, WeakComponent};
pub use lifecycle::{Lifecycle, LifecycleTable};
pub use schema::{AttrBinding, AttributeSchema};
pub use sync::{coerce, parse_number, reflect, Reflection};
