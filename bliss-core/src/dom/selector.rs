//! Compound selectors.
//!
//! Context lookup and subtree queries accept a single compound selector:
//! an optional type (`aha-tabs` or `*`) followed by any number of `#id`,
//! `.class`, `[attr]` and `[attr=value]` conditions. Combinators and
//! pseudo-classes are rejected.

use std::fmt;
use std::str::FromStr;

use super::Node;
use crate::error::BlissError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    conditions: Vec<Condition>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Cursor<'a> {
    source: &'a str,
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn error(&self, reason: impl Into<String>) -> BlissError {
        BlissError::InvalidSelector {
            selector: self.source.to_owned(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn ident(&mut self, what: &str) -> Result<&'a str, BlissError> {
        let end = self
            .rest
            .char_indices()
            .find(|&(_, c)| !is_ident_char(c))
            .map_or(self.rest.len(), |(i, _)| i);
        if end == 0 {
            return Err(self.error(format!("expected {what}")));
        }
        let (ident, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(ident)
    }

    fn attribute(&mut self) -> Result<Condition, BlissError> {
        let name = self.ident("attribute name")?.to_ascii_lowercase();
        match self.bump() {
            Some(']') => Ok(Condition::HasAttr(name)),
            Some('=') => {
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.bump();
                        let end = self
                            .rest
                            .find(quote)
                            .ok_or_else(|| self.error("unterminated string"))?;
                        let (value, rest) = self.rest.split_at(end);
                        self.rest = &rest[1..];
                        value.to_owned()
                    }
                    _ => self.ident("attribute value")?.to_owned(),
                };
                match self.bump() {
                    Some(']') => Ok(Condition::AttrEquals(name, value)),
                    _ => Err(self.error("expected `]`")),
                }
            }
            _ => Err(self.error("expected `]` or `=`")),
        }
    }
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, BlissError> {
        let trimmed = source.trim();
        let mut cursor = Cursor {
            source,
            rest: trimmed,
        };
        if trimmed.is_empty() {
            return Err(cursor.error("empty selector"));
        }

        let tag = match cursor.peek() {
            Some('*') => {
                cursor.bump();
                None
            }
            Some(c) if is_ident_char(c) => Some(cursor.ident("type")?.to_ascii_lowercase()),
            _ => None,
        };

        let mut conditions = Vec::new();
        while let Some(c) = cursor.bump() {
            let condition = match c {
                '#' => Condition::Id(cursor.ident("id")?.to_owned()),
                '.' => Condition::Class(cursor.ident("class name")?.to_owned()),
                '[' => cursor.attribute()?,
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~' | ',') => {
                    return Err(cursor.error("only compound selectors are supported"));
                }
                ':' => return Err(cursor.error("pseudo-classes are not supported")),
                other => return Err(cursor.error(format!("unexpected `{other}`"))),
            };
            conditions.push(condition);
        }

        Ok(Self {
            source: trimmed.to_owned(),
            tag,
            conditions,
        })
    }

    /// Check a single element against the selector.
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if node.local_name() != tag {
                return false;
            }
        }
        self.conditions.iter().all(|condition| match condition {
            Condition::Id(id) => node.get_attribute("id").as_deref() == Some(id.as_str()),
            Condition::Class(class) => node
                .get_attribute("class")
                .is_some_and(|list| list.split_whitespace().any(|c| c == class)),
            Condition::HasAttr(name) => node.has_attribute(name),
            Condition::AttrEquals(name, value) => {
                node.get_attribute(name).as_deref() == Some(value.as_str())
            }
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = BlissError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
