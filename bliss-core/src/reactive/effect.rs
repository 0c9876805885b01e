//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change. Components use effects for attribute reflection and
//! for their render watcher.
//!
//! # How Effects Work
//!
//! 1. When created, the effect registers with the runtime and runs its
//!    function immediately to establish initial dependencies.
//!
//! 2. When any dependency changes, the runtime schedules the effect, which
//!    re-runs synchronously.
//!
//! 3. Before re-running, the effect clears its old dependencies and tracks
//!    new ones during execution.
//!
//! An effect that is already running is not re-entered: a write to a
//! signal the effect itself reads does not recurse into it.
//!
//! # Disposal
//!
//! `dispose` unregisters the effect; it never runs again. Dropping the last
//! handle to an effect has the same outcome.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::{Reactive, ReactiveHandle, Runtime};
use super::subscriber::SubscriberId;

struct EffectInner {
    subscriber_id: SubscriberId,
    run: Box<dyn Fn() + Send + Sync>,
    dependencies: RwLock<HashSet<u64>>,
    disposed: AtomicBool,
    running: AtomicBool,
    run_count: AtomicUsize,
    handle: OnceLock<ReactiveHandle>,
}

impl Reactive for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn schedule(&self) {
        self.execute();
    }
}

/// Resets the running flag even if the effect function panics.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl EffectInner {
    fn execute(&self) {
        if self.disposed.load(Ordering::SeqCst) || self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let _running = RunningGuard(&self.running);

        Runtime::clear_dependencies(self.subscriber_id);

        let new_deps: HashSet<u64> = {
            let _ctx = ReactiveContext::enter(self.subscriber_id);
            (self.run)();
            ReactiveContext::get_dependencies().into_iter().collect()
        };

        *self.dependencies.write() = new_deps;
        self.run_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// let effect = Effect::new(move || {
///     println!("Count is: {}", count.get());
/// });
///
/// count.set(5);  // Prints: "Count is: 5"
/// ```
#[derive(Clone)]
pub struct Effect {
    inner: Arc<EffectInner>,
}

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately to establish initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let effect = Self::new_lazy(run);
        effect.execute();
        effect
    }

    /// Create a new effect without running it immediately.
    ///
    /// It has no dependencies until its first `execute`.
    pub fn new_lazy<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = Arc::new(EffectInner {
            subscriber_id: SubscriberId::new(),
            run: Box::new(run),
            dependencies: RwLock::new(HashSet::new()),
            disposed: AtomicBool::new(false),
            running: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
            handle: OnceLock::new(),
        });

        let reactive: Arc<dyn Reactive> = inner.clone();
        let _ = inner.handle.set(Runtime::register(&reactive));

        Self { inner }
    }

    /// Get the subscriber ID for this effect.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Execute the effect function within a tracking context.
    pub fn execute(&self) {
        self.inner.execute();
    }

    /// Schedule the effect to re-run.
    pub fn schedule(&self) {
        self.inner.schedule();
    }

    /// Dispose of the effect. After disposal, the effect will not run again.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::SeqCst) {
            Runtime::unregister(self.inner.subscriber_id);
            self.inner.dependencies.write().clear();
        }
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    /// Get the number of dependencies.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.read().len()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber_id", &self.inner.subscriber_id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn effect_runs_on_creation() {
        let run_count = Arc::new(AtomicI32::new(0));
        let run_count_clone = run_count.clone();

        let _effect = Effect::new(move || {
            run_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(run_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn effect_lazy_does_not_run_on_creation() {
        let effect = Effect::new_lazy(|| {});
        assert_eq!(effect.run_count(), 0);

        effect.execute();
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn effect_reruns_when_dependency_changes() {
        let signal = Signal::new(1);
        let seen = Arc::new(AtomicI32::new(0));

        let s = signal.clone();
        let seen_clone = seen.clone();
        let effect = Effect::new(move || {
            seen_clone.store(s.get(), Ordering::SeqCst);
        });

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(effect.dependency_count(), 1);

        signal.set(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(effect.run_count(), 2);
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let signal = Signal::new(0);
        let s = signal.clone();
        let effect = Effect::new(move || {
            let _ = s.get();
        });

        effect.dispose();
        assert!(effect.is_disposed());

        signal.set(1);
        effect.schedule();
        effect.execute();
        assert_eq!(effect.run_count(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn self_write_does_not_recurse() {
        let signal = Signal::new(0);
        let s = signal.clone();
        let effect = Effect::new(move || {
            let v = s.get();
            if v < 10 {
                s.set(v + 1);
            }
        });

        assert_eq!(effect.run_count(), 1);
        assert_eq!(signal.get_untracked(), 1);
    }

    #[test]
    fn dropping_effect_stops_reruns() {
        let signal = Signal::new(0);
        let count = Arc::new(AtomicI32::new(0));

        let s = signal.clone();
        let c = count.clone();
        let effect = Effect::new(move || {
            let _ = s.get();
            c.fetch_add(1, Ordering::SeqCst);
        });
        drop(effect);

        signal.set(3);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
