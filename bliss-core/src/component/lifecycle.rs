//! Lifecycle aggregation.
//!
//! Lifecycle hooks are the one kind of field that composes: every fragment
//! that defines `onMount` contributes a hook, and all of them run, in
//! fragment order, when the element is connected.

use smallvec::SmallVec;

use super::fragment::{Args, Field, Fragment, Function};
use super::instance::Component;
use crate::error::Result;
use crate::reactive::untrack;

/// A native lifecycle point with a hook name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Construction, before the first render.
    Init,
    /// Connected to a document.
    Mount,
    /// Disconnected from a document.
    Unmount,
    /// Moved into another document.
    Adopted,
}

impl Lifecycle {
    pub const ALL: [Lifecycle; 4] = [
        Lifecycle::Init,
        Lifecycle::Mount,
        Lifecycle::Unmount,
        Lifecycle::Adopted,
    ];

    pub fn hook_name(self) -> &'static str {
        match self {
            Lifecycle::Init => "onInit",
            Lifecycle::Mount => "onMount",
            Lifecycle::Unmount => "onUnmount",
            Lifecycle::Adopted => "onAdopted",
        }
    }

    pub fn from_hook_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lifecycle| lifecycle.hook_name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Ordered hook lists, one per lifecycle point.
#[derive(Clone, Default)]
pub struct LifecycleTable {
    hooks: [SmallVec<[Function; 2]>; 4],
}

impl LifecycleTable {
    /// Walk the fragments in merge order, appending each lifecycle hook.
    pub fn collect(chain: &[&Fragment]) -> Self {
        let mut table = Self::default();
        for fragment in chain {
            for lifecycle in Lifecycle::ALL {
                if let Some(Field::Function(hook)) = fragment.get(lifecycle.hook_name()) {
                    table.hooks[lifecycle.index()].push(hook.clone());
                }
            }
        }
        table
    }

    pub fn hooks(&self, lifecycle: Lifecycle) -> &[Function] {
        &self.hooks[lifecycle.index()]
    }

    /// Run every hook of `lifecycle` on `component`, in order.
    ///
    /// Hooks run untracked so their reads never subscribe whichever watcher
    /// caused the lifecycle change. The first failing hook stops the list.
    pub fn run(&self, lifecycle: Lifecycle, component: &Component) -> Result<()> {
        untrack(|| {
            for hook in self.hooks(lifecycle) {
                hook(component, Args::none())?;
            }
            Ok(())
        })
    }
}

impl std::fmt::Debug for LifecycleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for lifecycle in Lifecycle::ALL {
            map.entry(&lifecycle.hook_name(), &self.hooks(lifecycle).len());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_names_round_trip() {
        for lifecycle in Lifecycle::ALL {
            assert_eq!(Lifecycle::from_hook_name(lifecycle.hook_name()), Some(lifecycle));
        }
        assert_eq!(Lifecycle::from_hook_name("onmount"), None);
        assert_eq!(Lifecycle::from_hook_name("connectedCallback"), None);
    }

    #[test]
    fn hooks_append_in_fragment_order() {
        let first = Fragment::new().on_mount(|_| Ok(())).on_unmount(|_| Ok(()));
        let second = Fragment::new().data("onInit", true);
        let third = Fragment::new().on_mount(|_| Ok(()));

        let table = LifecycleTable::collect(&[&first, &second, &third]);
        assert_eq!(table.hooks(Lifecycle::Mount).len(), 2);
        assert_eq!(table.hooks(Lifecycle::Unmount).len(), 1);
        assert!(table.hooks(Lifecycle::Init).is_empty());
        assert!(table.hooks(Lifecycle::Adopted).is_empty());

        let Field::Function(expected) = first.get("onMount").unwrap() else {
            panic!("onMount should be a function");
        };
        assert!(std::sync::Arc::ptr_eq(&table.hooks(Lifecycle::Mount)[0], expected));
    }
}
