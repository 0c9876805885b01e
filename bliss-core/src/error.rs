//! Error types.

use thiserror::Error;

/// Definition-time failures, raised by `Registry::define` before any
/// instance exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("`attrs` of fragment #{fragment} is not a mapping")]
    AttrsNotAMapping { fragment: usize },

    #[error("`styles` of fragment #{fragment} is neither text nor a list of text")]
    StylesNotText { fragment: usize },

    #[error("attribute spec `{name}` is invalid: {reason}")]
    InvalidAttrSpec { name: String, reason: String },

    #[error("properties `{first}` and `{second}` both resolve to attribute `{attribute}`")]
    AttributeCollision {
        attribute: String,
        first: String,
        second: String,
    },

    #[error("`{0}` is not a valid custom element name")]
    InvalidTagName(String),

    #[error("<{0}> is already defined")]
    AlreadyDefined(String),

    #[error("<{name}> extends <{expected}>, not <{found}>")]
    ExtendsMismatch {
        name: String,
        expected: String,
        found: String,
    },
}

/// Errors surfaced by the component layer.
#[derive(Debug, Error)]
pub enum BlissError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("<{tag}> has no ancestor matching `{selector}`")]
    Lookup { tag: String, selector: String },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no component is defined as `{0}`")]
    NotDefined(String),

    #[error("<{tag}> has no method `{name}`")]
    UnknownMethod { tag: String, name: String },

    #[error("<{child}> cannot be inserted into or removed from <{parent}>")]
    HierarchyRequest { parent: String, child: String },

    #[error("<{0}> is no longer backed by an element")]
    Detached(String),

    #[error("{0}")]
    Hook(String),
}

impl BlissError {
    /// Error raised from inside a user hook, handler or method.
    pub fn hook(message: impl Into<String>) -> Self {
        BlissError::Hook(message.into())
    }
}

pub type Result<T, E = BlissError> = std::result::Result<T, E>;
