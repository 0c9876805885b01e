//! Mixin flattening.
//!
//! The fragments of a component are merged left to right: the implicit
//! defaults first, then the mixins in the order given, then the component's
//! own description. A later fragment replaces an earlier fragment's field of
//! the same name, except for:
//!
//! - `attrs`, merged per attribute (a later spec for the same attribute
//!   replaces the earlier spec as a whole);
//! - lifecycle hooks, which go to the [`LifecycleTable`](super::LifecycleTable)
//!   instead;
//! - `styles`, which are collected per fragment into the stylesheet set.

use indexmap::IndexMap;

use super::events;
use super::fragment::{AttrSpec, Field, Fragment, Function, RenderFn};
use super::lifecycle::Lifecycle;
use crate::error::ConfigurationError;
use crate::html;
use crate::value::Value;

/// The implicit first fragment of every component.
pub fn defaults() -> Fragment {
    Fragment::new()
        .attr("hidden", AttrSpec::boolean().with_default(false))
        .attr("disabled", AttrSpec::boolean().with_default(false))
        .render(|_| html![])
}

/// `[defaults, mixins..., own]`.
pub fn fragment_chain<'a>(
    defaults: &'a Fragment,
    mixins: &'a [Fragment],
    own: &'a Fragment,
) -> Vec<&'a Fragment> {
    std::iter::once(defaults)
        .chain(mixins)
        .chain(std::iter::once(own))
        .collect()
}

/// The merged, immutable description of a component type.
#[derive(Debug, Clone, Default)]
pub struct FlattenedDescription {
    fields: IndexMap<String, Field>,
    attrs: IndexMap<String, AttrSpec>,
}

fn attrs_of(index: usize, field: &Field) -> Result<IndexMap<String, AttrSpec>, ConfigurationError> {
    match field {
        Field::Attrs(attrs) => Ok(attrs.clone()),
        Field::Data(Value::Object(entries)) => entries
            .iter()
            .map(|(name, spec)| Ok((name.clone(), AttrSpec::from_value(name, spec)?)))
            .collect(),
        _ => Err(ConfigurationError::AttrsNotAMapping { fragment: index }),
    }
}

/// Merge a fragment chain into one description.
pub fn flatten(chain: &[&Fragment]) -> Result<FlattenedDescription, ConfigurationError> {
    let mut flat = FlattenedDescription::default();

    for (index, fragment) in chain.iter().enumerate() {
        for (name, field) in fragment.iter() {
            match name {
                "attrs" => flat.attrs.extend(attrs_of(index, field)?),
                "styles" => {}
                _ if Lifecycle::from_hook_name(name).is_some()
                    && matches!(field, Field::Function(_)) => {}
                _ => {
                    flat.fields.insert(name.to_owned(), field.clone());
                }
            }
        }
    }

    Ok(flat)
}

impl FlattenedDescription {
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.get(name).and_then(Field::as_function)
    }

    pub fn data(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Field::as_data)
    }

    pub fn render_fn(&self) -> Option<&RenderFn> {
        match self.get("render") {
            Some(Field::Render(render)) => Some(render),
            _ => None,
        }
    }

    pub fn attrs(&self) -> &IndexMap<String, AttrSpec> {
        &self.attrs
    }

    /// Event types with an installed handler, in field order.
    pub fn event_types(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, field)| matches!(field, Field::Function(_)))
            .filter_map(|(name, _)| events::event_type(name))
            .map(str::to_owned)
            .collect()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::fragment::AttrType;
    use std::sync::Arc;

    fn flatten_all(mixins: &[Fragment], own: &Fragment) -> Result<FlattenedDescription, ConfigurationError> {
        let defaults = defaults();
        flatten(&fragment_chain(&defaults, mixins, own))
    }

    #[test]
    fn defaults_provide_hidden_disabled_and_render() {
        let flat = flatten_all(&[], &Fragment::new()).unwrap();
        assert_eq!(flat.attrs().get("hidden"), Some(&AttrSpec::boolean().with_default(false)));
        assert!(flat.attrs().contains_key("disabled"));
        assert!(flat.render_fn().is_some());
    }

    #[test]
    fn attrs_merge_keywise_and_later_spec_wins_whole() {
        let mixin = Fragment::new()
            .attr("active", AttrSpec::boolean())
            .attr("label", AttrSpec::string().with_default("m").attribute("x-label"));
        let own = Fragment::new()
            .attr("label", AttrSpec::number())
            .attr("hidden", AttrSpec::string().with_default("yes"));

        let flat = flatten_all(&[mixin], &own).unwrap();
        let names: Vec<&str> = flat.attrs().keys().map(String::as_str).collect();
        assert_eq!(names, ["hidden", "disabled", "active", "label"]);
        assert_eq!(flat.attrs()["label"], AttrSpec::number());
        assert_eq!(flat.attrs()["hidden"].ty, AttrType::String);
    }

    #[test]
    fn later_fields_override_and_own_description_wins() {
        let first = Fragment::new().data("shadow", false).data("size", 1);
        let second = Fragment::new().data("size", 2);
        let own = Fragment::new().data("size", 3);

        let flat = flatten_all(&[first, second], &own).unwrap();
        assert_eq!(flat.data("size"), Some(&Value::from(3)));
        assert_eq!(flat.data("shadow"), Some(&Value::Bool(false)));
    }

    #[test]
    fn event_handlers_override_and_lifecycle_hooks_stay_out() {
        let mixin = Fragment::new()
            .handler("onclick", |_, _| Ok(()))
            .on_mount(|_| Ok(()));
        let own = Fragment::new().handler("onclick", |_, _| Ok(())).handler("oninput", |_, _| Ok(()));

        let flat = flatten_all(&[mixin], &own).unwrap();
        assert_eq!(flat.event_types(), ["click", "input"]);
        assert!(flat.get("onMount").is_none());

        let Some(Field::Function(own_click)) = own.get("onclick") else {
            panic!("onclick should be a function");
        };
        assert!(Arc::ptr_eq(flat.function("onclick").unwrap(), own_click));
    }

    #[test]
    fn attrs_may_be_given_as_data() {
        let own = Fragment::new().data(
            "attrs",
            Value::from_json(r#"{"tabindex": {"type": "Number", "default": 0}}"#).unwrap(),
        );
        let flat = flatten_all(&[], &own).unwrap();
        assert_eq!(flat.attrs()["tabindex"], AttrSpec::number().with_default(0));
    }

    #[test]
    fn non_mapping_attrs_are_rejected() {
        let bad = Fragment::new().data("attrs", "hidden");
        let err = flatten_all(&[bad], &Fragment::new()).unwrap_err();
        assert_eq!(err, ConfigurationError::AttrsNotAMapping { fragment: 1 });
    }
}
