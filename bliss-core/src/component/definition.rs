//! Component types.
//!
//! A [`ComponentType`] is everything derived once per tag at definition
//! time: the flattened description, the lifecycle table, the attribute
//! schema, the pre-bound event types and the shared stylesheet set. Every
//! instance of the tag holds an `Arc` to the same type.

use std::fmt;
use std::sync::Arc;

use super::fragment::{Field, Fragment};
use super::flatten::{self, FlattenedDescription};
use super::lifecycle::LifecycleTable;
use super::schema::AttributeSchema;
use crate::error::ConfigurationError;
use crate::render::{Renderer, StyleSheet};
use crate::value::Value;

/// Options accepted by [`Registry::define`](crate::registry::Registry::define).
#[derive(Debug, Clone, Default)]
pub struct DefineOptions {
    /// Fragments merged between the defaults and the own description.
    pub mixins: Vec<Fragment>,
    /// Native element a customized built-in extends, e.g. `button`.
    pub extends: Option<String>,
}

impl DefineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mixin(mut self, mixin: Fragment) -> Self {
        self.mixins.push(mixin);
        self
    }

    pub fn mixins(mut self, mixins: impl IntoIterator<Item = Fragment>) -> Self {
        self.mixins.extend(mixins);
        self
    }

    pub fn extends(mut self, local_name: impl Into<String>) -> Self {
        self.extends = Some(local_name.into());
        self
    }
}

/// One stylesheet per fragment that declares styles, in fragment order.
fn collect_stylesheets(chain: &[&Fragment]) -> Result<Vec<Arc<StyleSheet>>, ConfigurationError> {
    let mut sheets = Vec::new();
    for (fragment, field) in chain
        .iter()
        .enumerate()
        .filter_map(|(index, fragment)| Some((index, fragment.get("styles")?)))
    {
        let rules = match field {
            Field::Styles(texts) => texts.concat(),
            Field::Data(Value::String(text)) => text.clone(),
            Field::Data(Value::List(items)) => items
                .iter()
                .map(|item| item.as_str().ok_or(ConfigurationError::StylesNotText { fragment }))
                .collect::<Result<String, _>>()?,
            _ => return Err(ConfigurationError::StylesNotText { fragment }),
        };
        if !rules.is_empty() {
            sheets.push(Arc::new(StyleSheet::new(rules)));
        }
    }
    Ok(sheets)
}

/// The immutable, shared definition of a tag.
pub struct ComponentType {
    name: String,
    extends: Option<String>,
    description: FlattenedDescription,
    lifecycle: LifecycleTable,
    schema: AttributeSchema,
    events: Vec<String>,
    stylesheets: Arc<[Arc<StyleSheet>]>,
    renderer: Arc<dyn Renderer>,
}

impl ComponentType {
    /// Flatten `[defaults, mixins..., own]` and derive the type.
    pub fn build(
        name: &str,
        own: Fragment,
        options: DefineOptions,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, ConfigurationError> {
        let defaults = flatten::defaults();
        let chain = flatten::fragment_chain(&defaults, &options.mixins, &own);

        let description = flatten::flatten(&chain)?;
        let schema = AttributeSchema::resolve(description.attrs())?;
        let lifecycle = LifecycleTable::collect(&chain);
        let events = description.event_types();
        let stylesheets = collect_stylesheets(&chain)?.into();

        Ok(Self {
            name: name.to_owned(),
            extends: options.extends.map(|local| local.to_ascii_lowercase()),
            description,
            lifecycle,
            schema,
            events,
            stylesheets,
            renderer,
        })
    }

    /// The tag this type is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    pub fn description(&self) -> &FlattenedDescription {
        &self.description
    }

    pub fn lifecycle(&self) -> &LifecycleTable {
        &self.lifecycle
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn observed_attributes(&self) -> &[String] {
        self.schema.observed_attributes()
    }

    /// Event types bound on every instance, one listener each.
    pub fn event_types(&self) -> &[String] {
        &self.events
    }

    pub fn stylesheets(&self) -> &[Arc<StyleSheet>] {
        &self.stylesheets
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("extends", &self.extends)
            .field("observed_attributes", &self.observed_attributes())
            .field("events", &self.events)
            .field("lifecycle", &self.lifecycle)
            .field("stylesheets", &self.stylesheets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::fragment::AttrSpec;
    use crate::component::Lifecycle;
    use crate::render::MarkupRenderer;

    fn build(own: Fragment, options: DefineOptions) -> Result<ComponentType, ConfigurationError> {
        ComponentType::build("x-test", own, options, Arc::new(MarkupRenderer))
    }

    #[test]
    fn stylesheets_are_one_per_styled_fragment() {
        let plain = Fragment::new().data("size", 1);
        let styled = Fragment::new().styles(":host { display: block; }").styles("p { margin: 0; }");
        let own = Fragment::new().data("styles", Value::from(vec!["a {}", "b {}"]));

        let ty = build(own, DefineOptions::new().mixins([plain, styled])).unwrap();
        let rules: Vec<&str> = ty.stylesheets().iter().map(|sheet| sheet.rules()).collect();
        assert_eq!(rules, [":host { display: block; }p { margin: 0; }", "a {}b {}"]);
    }

    #[test]
    fn derives_schema_events_and_lifecycle() {
        let mixin = Fragment::new()
            .attr("selectedIndex", AttrSpec::number().with_default(0))
            .on_mount(|_| Ok(()))
            .handler("onkeydown", |_, _| Ok(()));
        let own = Fragment::new().on_mount(|_| Ok(())).handler("onclick", |_, _| Ok(()));

        let ty = build(own, DefineOptions::new().mixin(mixin).extends("BUTTON")).unwrap();
        assert_eq!(
            ty.observed_attributes(),
            ["hidden", "disabled", "selected-index"]
        );
        assert_eq!(ty.event_types(), ["keydown", "click"]);
        assert_eq!(ty.lifecycle().hooks(Lifecycle::Mount).len(), 2);
        assert_eq!(ty.extends(), Some("button"));
        assert_eq!(ty.name(), "x-test");
    }

    #[test]
    fn styles_must_be_text() {
        let mixin = Fragment::new().data("styles", 42);
        assert!(matches!(
            build(Fragment::new(), DefineOptions::new().mixin(mixin)),
            Err(ConfigurationError::StylesNotText { fragment: 1 })
        ));

        let own = Fragment::new().data("styles", vec![Value::from("a {}"), Value::from(1)]);
        assert!(matches!(
            build(own, DefineOptions::new()),
            Err(ConfigurationError::StylesNotText { fragment: 1 })
        ));
    }

    #[test]
    fn colliding_attributes_fail_at_build_time() {
        let own = Fragment::new().attr("isHidden", AttrSpec::boolean().attribute("hidden"));
        assert!(matches!(
            build(own, DefineOptions::new()),
            Err(ConfigurationError::AttributeCollision { .. })
        ));
    }
}
