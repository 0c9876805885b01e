//! Attribute schema resolution.
//!
//! Turns the merged `attrs` mapping into bindings between DOM attribute
//! names and state property names. Each property gets exactly one
//! attribute: the explicit `attribute` override, or the kebab-case form of
//! the property name (`fooBar` becomes `foo-bar`). Two properties may not
//! share an attribute.

use std::collections::HashMap;

use heck::ToKebabCase;
use indexmap::IndexMap;

use super::fragment::{AttrSpec, AttrType};
use crate::error::ConfigurationError;
use crate::value::Value;

/// One property ↔ attribute link.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrBinding {
    pub property: String,
    pub attribute: String,
    pub spec: AttrSpec,
}

impl AttrBinding {
    /// Whether state changes are written back to the attribute.
    pub fn is_reflected(&self) -> bool {
        self.spec.reflect && self.spec.ty != AttrType::Function
    }

    /// The value state starts with. Booleans without a default start `false`.
    pub fn initial_value(&self) -> Value {
        match (&self.spec.default, self.spec.ty) {
            (Value::Null, AttrType::Boolean) => Value::Bool(false),
            (default, _) => default.clone(),
        }
    }
}

/// Resolved attribute bindings of a component type.
#[derive(Debug, Clone, Default)]
pub struct AttributeSchema {
    bindings: Vec<AttrBinding>,
    observed: Vec<String>,
    by_attribute: HashMap<String, usize>,
    by_property: HashMap<String, usize>,
}

fn valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '='))
}

impl AttributeSchema {
    pub fn resolve(attrs: &IndexMap<String, AttrSpec>) -> Result<Self, ConfigurationError> {
        let mut schema = Self::default();

        for (property, spec) in attrs {
            let attribute = match &spec.attribute {
                Some(name) => name.to_ascii_lowercase(),
                None => property.to_kebab_case(),
            };
            if !valid_attribute_name(&attribute) {
                return Err(ConfigurationError::InvalidAttrSpec {
                    name: property.clone(),
                    reason: format!("`{attribute}` is not a valid attribute name"),
                });
            }
            if let Some(&existing) = schema.by_attribute.get(&attribute) {
                return Err(ConfigurationError::AttributeCollision {
                    attribute,
                    first: schema.bindings[existing].property.clone(),
                    second: property.clone(),
                });
            }

            let index = schema.bindings.len();
            schema.by_attribute.insert(attribute.clone(), index);
            schema.by_property.insert(property.clone(), index);
            schema.observed.push(attribute.clone());
            schema.bindings.push(AttrBinding {
                property: property.clone(),
                attribute,
                spec: spec.clone(),
            });
        }

        Ok(schema)
    }

    /// Attribute names whose mutations are reported to instances.
    pub fn observed_attributes(&self) -> &[String] {
        &self.observed
    }

    pub fn by_attribute(&self, attribute: &str) -> Option<&AttrBinding> {
        self.by_attribute.get(attribute).map(|&i| &self.bindings[i])
    }

    pub fn by_property(&self, property: &str) -> Option<&AttrBinding> {
        self.by_property.get(property).map(|&i| &self.bindings[i])
    }

    pub fn bindings(&self) -> &[AttrBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
