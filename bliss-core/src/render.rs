//! Render collaborator.
//!
//! Components describe their output as a [`Template`]: static markup
//! interleaved with embedded expressions. A [`Renderer`] reconciles a
//! [`RenderTarget`] with a template. The bundled [`MarkupRenderer`] writes
//! the serialized markup into the target and skips the write when nothing
//! changed; diffing real element trees is left to other renderers.
//!
//! Templates are built with the [`html!`](crate::html) macro:
//!
//! ```rust,ignore
//! html!["<h1>Hello ", this.state().get("name"), "</h1>"]
//! ```

use std::sync::Arc;

use crate::dom::{Node, ShadowRoot};
use crate::value::Value;

/// One piece of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Trusted static markup.
    Markup(&'static str),
    /// An embedded expression, escaped on output.
    Expr(Value),
    /// A nested template.
    Nested(Template),
}

impl From<&'static str> for Part {
    fn from(markup: &'static str) -> Self {
        Part::Markup(markup)
    }
}

impl From<Value> for Part {
    fn from(value: Value) -> Self {
        Part::Expr(value)
    }
}

impl From<String> for Part {
    fn from(text: String) -> Self {
        Part::Expr(Value::String(text))
    }
}

impl From<Template> for Part {
    fn from(template: Template) -> Self {
        Part::Nested(template)
    }
}

/// A declarative description of a component's contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: impl Into<Part>) {
        self.parts.push(part.into());
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Serialize to markup, escaping expressions.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        for part in &self.parts {
            match part {
                Part::Markup(markup) => out.push_str(markup),
                Part::Expr(Value::Null) => {}
                Part::Expr(value) => escape_into(out, &value.to_string()),
                Part::Nested(template) => template.write_markup(out),
            }
        }
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Build a [`Template`] from static markup and expressions.
#[macro_export]
macro_rules! html {
    ($($part:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut template = $crate::render::Template::new();
        $( template.push($part); )*
        template
    }};
}

/// An immutable stylesheet shared by every instance of a component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    rules: String,
}

impl StyleSheet {
    pub fn new(rules: impl Into<String>) -> Self {
        Self { rules: rules.into() }
    }

    pub fn rules(&self) -> &str {
        &self.rules
    }
}

/// Where a component's template output goes.
#[derive(Debug, Clone)]
pub enum RenderTarget {
    /// An isolated rendering boundary owned by the instance.
    Shadow(ShadowRoot),
    /// The element itself (light DOM).
    Host(Node),
}

impl RenderTarget {
    pub fn markup(&self) -> String {
        match self {
            RenderTarget::Shadow(root) => root.markup(),
            RenderTarget::Host(node) => node.markup(),
        }
    }

    /// Replace the target's contents. Returns whether anything changed.
    pub fn replace_markup(&self, markup: String) -> bool {
        match self {
            RenderTarget::Shadow(root) => root.replace_markup(markup),
            RenderTarget::Host(node) => node.replace_markup(markup),
        }
    }

    /// Stylesheets in effect for the target. Light-DOM targets carry none.
    pub fn stylesheets(&self) -> Vec<Arc<StyleSheet>> {
        match self {
            RenderTarget::Shadow(root) => root.adopted_stylesheets(),
            RenderTarget::Host(_) => Vec::new(),
        }
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, RenderTarget::Shadow(_))
    }
}

/// Reconciles a render target with a template.
pub trait Renderer: Send + Sync {
    fn render(&self, target: &RenderTarget, template: &Template);
}

/// Renders templates to markup strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupRenderer;

impl Renderer for MarkupRenderer {
    fn render(&self, target: &RenderTarget, template: &Template) {
        if target.replace_markup(template.to_markup()) {
            tracing::trace!(shadow = target.is_shadow(), "render target updated");
        }
    }
}
