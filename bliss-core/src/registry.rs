//! Element registry.
//!
//! Binds tag names to [`ComponentType`]s. Each tag is defined at most once;
//! definitions are immutable afterwards. The registry is an ordinary value
//! handed to [`Document::new`](crate::dom::Document::new), so separate
//! documents may use separate registries.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::component::{ComponentType, DefineOptions, Fragment};
use crate::error::{ConfigurationError, Result};
use crate::render::{MarkupRenderer, Renderer};

/// Names the platform reserves even though they contain a hyphen.
const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Custom element name rules: starts with a lowercase ASCII letter,
/// contains a hyphen, and has no uppercase ASCII letters.
fn validate_tag_name(name: &str) -> Result<(), ConfigurationError> {
    let valid = name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.contains('-')
        && name.chars().all(|c| {
            c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || matches!(c, '-' | '.' | '_')
                || !c.is_ascii()
        })
        && !RESERVED_NAMES.contains(&name);

    if valid {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidTagName(name.to_owned()))
    }
}

/// Native element names only: ASCII alphanumerics, no hyphen.
fn validate_extends(local_name: &str) -> Result<(), ConfigurationError> {
    if !local_name.is_empty() && local_name.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidTagName(local_name.to_owned()))
    }
}

/// Tag name → component type.
pub struct Registry {
    definitions: DashMap<String, Arc<ComponentType>>,
    renderer: Arc<dyn Renderer>,
}

impl Registry {
    /// A registry rendering with [`MarkupRenderer`].
    pub fn new() -> Self {
        Self::with_renderer(Arc::new(MarkupRenderer))
    }

    pub fn with_renderer(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            definitions: DashMap::new(),
            renderer,
        }
    }

    /// Define `name` from `own` plus the mixins in `options`.
    ///
    /// All configuration errors surface here, before any instance exists.
    pub fn define(
        &self,
        name: &str,
        own: Fragment,
        options: DefineOptions,
    ) -> Result<Arc<ComponentType>> {
        validate_tag_name(name)?;
        if let Some(extends) = &options.extends {
            validate_extends(extends)?;
        }
        if self.definitions.contains_key(name) {
            return Err(ConfigurationError::AlreadyDefined(name.to_owned()).into());
        }

        let mixins = options.mixins.len();
        let ty = Arc::new(ComponentType::build(
            name,
            own,
            options,
            Arc::clone(&self.renderer),
        )?);

        match self.definitions.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(ConfigurationError::AlreadyDefined(name.to_owned()).into()),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&ty));
                debug!(
                    tag = name,
                    mixins,
                    extends = ?ty.extends(),
                    observed = ?ty.observed_attributes(),
                    events = ?ty.event_types(),
                    "component defined"
                );
                Ok(ty)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<ComponentType>> {
        self.definitions.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Defined tag names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("names", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::AttrSpec;
    use crate::error::BlissError;

    #[test]
    fn tag_name_rules() {
        for name in ["aha-tabs", "x-1", "my-élément", "a-b.c_d"] {
            assert!(validate_tag_name(name).is_ok(), "{name}");
        }
        for name in ["tabs", "Aha-tabs", "aha-Tabs", "1-x", "-x", "font-face", "a-b c"] {
            assert!(validate_tag_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn definitions_insert_once() {
        let registry = Registry::new();
        let first = registry.define("x-once", Fragment::new(), DefineOptions::new()).unwrap();
        let again = registry.define("x-once", Fragment::new(), DefineOptions::new());

        assert!(matches!(
            again,
            Err(BlissError::Configuration(ConfigurationError::AlreadyDefined(name))) if name == "x-once"
        ));
        assert!(Arc::ptr_eq(&first, &registry.get("x-once").unwrap()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_definitions_leave_no_entry() {
        let registry = Registry::new();
        let own = Fragment::new()
            .attr("a", AttrSpec::string().attribute("same"))
            .attr("b", AttrSpec::string().attribute("same"));

        assert!(registry.define("x-clash", own, DefineOptions::new()).is_err());
        assert!(!registry.is_defined("x-clash"));
        assert!(registry
            .define("x-button", Fragment::new(), DefineOptions::new().extends("fancy-button"))
            .is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let registry = Registry::new();
        for name in ["x-b", "x-a", "x-c"] {
            registry.define(name, Fragment::new(), DefineOptions::new()).unwrap();
        }
        assert_eq!(registry.names(), ["x-a", "x-b", "x-c"]);
    }
}
