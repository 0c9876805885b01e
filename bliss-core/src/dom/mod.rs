//! Host element tree.
//!
//! The minimal element model components are upgraded onto: documents,
//! element nodes with attributes and children, event listeners with
//! bubbling dispatch, and isolated render roots. It supplies the native
//! lifecycle points the component layer hooks into and nothing more; there
//! is no parser, layout or style resolution.

mod document;
mod event;
mod node;
mod selector;

pub use document::Document;
pub use event::{Event, Listener, ListenerId};
pub use node::{Node, ShadowRoot, WeakNode};
pub use selector::Selector;
