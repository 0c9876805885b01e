//! Attribute ↔ state conversion.
//!
//! Inbound coercion turns a raw attribute value into state according to
//! the declared [`AttrType`]; outbound reflection turns state back into an
//! attribute write. Coercion is lenient: malformed numbers become NaN and
//! malformed structured values fall back to the raw string.

use super::fragment::AttrType;
use crate::value::Value;

/// Coerce a raw attribute value. `None` means the attribute is absent.
pub fn coerce(ty: AttrType, raw: Option<&str>) -> Value {
    match (ty, raw) {
        (AttrType::Boolean, None | Some("false")) => Value::Bool(false),
        (AttrType::Boolean, Some(_)) => Value::Bool(true),
        (_, None) => Value::Null,
        (AttrType::Number, Some(raw)) => Value::Number(parse_number(raw)),
        (_, Some(raw)) => {
            Value::from_json(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
        }
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return f64::NAN;
    }
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d))
}

/// Lenient numeric parse of an attribute string.
///
/// Surrounding whitespace is ignored and a blank string is zero. Accepts
/// decimal and exponent forms, `0x`/`0o`/`0b` prefixed integers and
/// `Infinity`. Anything else is NaN.
pub fn parse_number(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }

    let prefix = text.get(..2).map(str::to_ascii_lowercase);
    match prefix.as_deref() {
        Some("0x") => return parse_radix(&text[2..], 16),
        Some("0o") => return parse_radix(&text[2..], 8),
        Some("0b") => return parse_radix(&text[2..], 2),
        _ => {}
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

/// The attribute write implied by a state value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reflection {
    Remove,
    Set(String),
}

pub fn reflect(ty: AttrType, value: &Value) -> Reflection {
    match value {
        Value::Null | Value::Bool(false) => Reflection::Remove,
        Value::Bool(true) => Reflection::Set(String::new()),
        _ if ty == AttrType::List => Reflection::Set(value.to_json()),
        _ => Reflection::Set(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_coercion() {
        assert_eq!(coerce(AttrType::Boolean, None), Value::Bool(false));
        assert_eq!(coerce(AttrType::Boolean, Some("false")), Value::Bool(false));
        for raw in ["", "true", "0", "no", "False"] {
            assert_eq!(coerce(AttrType::Boolean, Some(raw)), Value::Bool(true), "{raw:?}");
        }
    }

    #[test]
    fn number_coercion() {
        assert_eq!(coerce(AttrType::Number, Some("42")), Value::from(42));
        assert_eq!(coerce(AttrType::Number, Some(" -1.5e2 ")), Value::from(-150.0));
        assert_eq!(coerce(AttrType::Number, Some("")), Value::from(0));
        assert_eq!(coerce(AttrType::Number, None), Value::Null);
        assert!(parse_number("12px").is_nan());
        assert!(parse_number("nan").is_nan());
        assert!(parse_number("1_000").is_nan());
        assert!(parse_number("0x").is_nan());
    }

    #[test]
    fn number_prefixes_and_infinity() {
        assert_eq!(parse_number("0x1F"), 31.0);
        assert_eq!(parse_number("0b101"), 5.0);
        assert_eq!(parse_number("0o17"), 15.0);
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_number(".5"), 0.5);
    }

    #[test]
    fn structured_coercion_falls_back_to_raw_string() {
        assert_eq!(
            coerce(AttrType::List, Some("[1,2,3]")),
            Value::from(vec![1, 2, 3])
        );
        assert_eq!(
            coerce(AttrType::Object, Some(r#"{"a":true}"#)).get("a"),
            Some(&Value::Bool(true))
        );
        assert_eq!(coerce(AttrType::String, Some("hello")), Value::from("hello"));
        assert_eq!(coerce(AttrType::List, Some("[1,")), Value::from("[1,"));
        assert_eq!(coerce(AttrType::Any, Some("7")), Value::from(7));
        assert_eq!(coerce(AttrType::String, None), Value::Null);
    }

    #[test]
    fn reflection_rules() {
        assert_eq!(reflect(AttrType::Boolean, &Value::Bool(true)), Reflection::Set(String::new()));
        assert_eq!(reflect(AttrType::Boolean, &Value::Bool(false)), Reflection::Remove);
        assert_eq!(reflect(AttrType::String, &Value::Null), Reflection::Remove);
        assert_eq!(reflect(AttrType::Number, &Value::from(3)), Reflection::Set("3".into()));
        assert_eq!(reflect(AttrType::Number, &Value::from(0.25)), Reflection::Set("0.25".into()));
        assert_eq!(reflect(AttrType::String, &Value::from("x y")), Reflection::Set("x y".into()));
        assert_eq!(
            reflect(AttrType::List, &Value::from(vec![1, 2, 3])),
            Reflection::Set("[1,2,3]".into())
        );
        assert_eq!(
            reflect(AttrType::List, &Value::from("solo")),
            Reflection::Set("\"solo\"".into())
        );
    }

    #[test]
    fn reflected_lists_decode_back() {
        let list = Value::from(vec![Value::from(1), Value::from("two"), Value::Bool(false)]);
        let Reflection::Set(raw) = reflect(AttrType::List, &list) else {
            panic!("lists are always set");
        };
        assert_eq!(coerce(AttrType::List, Some(&raw)), list);
    }
}
