//! Reactive Primitives
//!
//! This module is the observable collaborator of the component layer. It
//! offers exactly the two capabilities components rely on:
//!
//! - [`observable`]: wrap a plain mapping into a dependency-tracked [`Store`];
//! - [`observe`]: run a computation so that the reads it performs are
//!   tracked and it re-runs whenever one of them changes.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within a tracking context, the signal registers that context as a
//! dependent. When the signal's value changes, all dependents re-run.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change. Components use effects to reflect state onto
//! attributes and to redraw.
//!
//! # Implementation Notes
//!
//! Tracking uses a thread-local context stack. Propagation is synchronous
//! and push-based: a write re-runs its dependents before returning. There is
//! no batching, so several writes in a row produce several re-runs.

mod context;
mod effect;
mod runtime;
mod signal;
mod store;
mod subscriber;

pub use context::ReactiveContext;
pub use effect::Effect;
pub use runtime::{Reactive, ReactiveHandle, Runtime};
pub use signal::Signal;
pub use store::Store;
pub use subscriber::SubscriberId;

use indexmap::IndexMap;

use crate::value::Value;

/// Wrap a mapping into a tracked store.
pub fn observable(initial: IndexMap<String, Value>) -> Store {
    Store::from_map(initial)
}

/// Run `f` now and again whenever a value it read changes.
///
/// The returned effect keeps the computation alive; dispose or drop it to
/// stop re-runs.
pub fn observe<F>(f: F) -> Effect
where
    F: Fn() + Send + Sync + 'static,
{
    Effect::new(f)
}

/// Run `f` without attributing its reads to the surrounding computation.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _scope = ReactiveContext::untracked();
    f()
}
