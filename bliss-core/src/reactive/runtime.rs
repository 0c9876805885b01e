//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects signals and
//! watchers. It records which watcher read which signal and re-runs the
//! affected watchers when a signal changes.
//!
//! # How It Works
//!
//! 1. When a watcher is created, it registers with the runtime.
//!
//! 2. When a watcher reads a signal, the runtime records the dependency.
//!
//! 3. When a signal's value changes, the runtime finds every dependent
//!    watcher and schedules it. Scheduling runs the watcher synchronously;
//!    there is no queue and no batching.
//!
//! # Thread Safety
//!
//! Tracking uses the thread-local context stack; the registry and the
//! dependency table are process-wide and guarded by `parking_lot` locks.
//! No lock is held while a watcher runs.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, Weak};

use indexmap::IndexSet;
use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::subscriber::SubscriberId;

/// A computation the runtime can re-run when its dependencies change.
pub trait Reactive: Send + Sync {
    /// Get the subscriber ID for this computation.
    fn subscriber_id(&self) -> SubscriberId;

    /// Re-run the computation.
    fn schedule(&self);
}

/// Handle to a registered computation.
///
/// Dropping this handle unregisters the computation from the runtime.
#[derive(Debug)]
pub struct ReactiveHandle {
    subscriber_id: SubscriberId,
}

impl Drop for ReactiveHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
    }
}

/// Dependency edges, indexed in both directions.
#[derive(Default)]
struct Edges {
    /// Signal ID to the watchers that read it, in first-read order.
    by_signal: HashMap<u64, IndexSet<SubscriberId>>,
    /// Watcher to the signals it read during its last run.
    by_subscriber: HashMap<SubscriberId, HashSet<u64>>,
}

/// The global reactive runtime.
pub struct Runtime;

static REGISTRY: OnceLock<RwLock<HashMap<SubscriberId, Weak<dyn Reactive>>>> = OnceLock::new();
static EDGES: OnceLock<RwLock<Edges>> = OnceLock::new();

fn get_registry() -> &'static RwLock<HashMap<SubscriberId, Weak<dyn Reactive>>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn get_edges() -> &'static RwLock<Edges> {
    EDGES.get_or_init(|| RwLock::new(Edges::default()))
}

impl Runtime {
    /// Register a computation with the runtime.
    ///
    /// Only a weak reference is kept. Returns a handle that unregisters the
    /// computation when dropped.
    pub fn register(reactive: &Arc<dyn Reactive>) -> ReactiveHandle {
        let id = reactive.subscriber_id();
        get_registry().write().insert(id, Arc::downgrade(reactive));
        ReactiveHandle { subscriber_id: id }
    }

    /// Unregister a computation and drop all of its dependency edges.
    pub(crate) fn unregister(id: SubscriberId) {
        get_registry().write().remove(&id);
        Self::clear_dependencies(id);
    }

    /// Record that a subscriber depends on a signal.
    ///
    /// Called automatically when a signal is read within a reactive context.
    pub fn add_dependency(signal_id: u64, subscriber_id: SubscriberId) {
        let mut edges = get_edges().write();
        edges.by_signal.entry(signal_id).or_default().insert(subscriber_id);
        edges.by_subscriber.entry(subscriber_id).or_default().insert(signal_id);
    }

    /// Remove all dependencies for a subscriber.
    ///
    /// Called before re-running a computation to clear stale dependencies.
    pub fn clear_dependencies(subscriber_id: SubscriberId) {
        let mut edges = get_edges().write();
        let Some(signals) = edges.by_subscriber.remove(&subscriber_id) else {
            return;
        };
        for signal_id in signals {
            if let Some(subs) = edges.by_signal.get_mut(&signal_id) {
                subs.shift_remove(&subscriber_id);
                if subs.is_empty() {
                    edges.by_signal.remove(&signal_id);
                }
            }
        }
    }

    /// Forget a signal that no longer exists.
    pub(crate) fn forget_signal(signal_id: u64) {
        let mut edges = get_edges().write();
        if let Some(subs) = edges.by_signal.remove(&signal_id) {
            for sub in subs {
                if let Some(signals) = edges.by_subscriber.get_mut(&sub) {
                    signals.remove(&signal_id);
                }
            }
        }
    }

    /// Number of subscribers currently depending on a signal.
    pub fn dependent_count(signal_id: u64) -> usize {
        get_edges()
            .read()
            .by_signal
            .get(&signal_id)
            .map_or(0, IndexSet::len)
    }

    /// Notify all subscribers that a signal changed.
    ///
    /// Dependents run synchronously, in the order they first read the signal.
    pub fn notify_signal_change(signal_id: u64) {
        let subscriber_ids: Vec<SubscriberId> = match get_edges().read().by_signal.get(&signal_id) {
            Some(subs) => subs.iter().copied().collect(),
            None => return,
        };

        let to_run: Vec<Arc<dyn Reactive>> = {
            let registry = get_registry().read();
            subscriber_ids
                .iter()
                .filter_map(|id| registry.get(id).and_then(Weak::upgrade))
                .collect()
        };

        for reactive in to_run {
            reactive.schedule();
        }
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }
}
