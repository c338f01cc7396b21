//! # Default Coercion
//!
//! Converts a raw default value into the value space of its declared schema type.
//! Conversions are lossy where the producer's data requires it; anything that cannot
//! be converted falls back to the type's zero value.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt::Display;

/// The primitive schema types emitted by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// A keyed object.
    Object,
    /// An ordered list.
    Array,
    /// A string.
    String,
    /// An integer.
    Integer,
    /// A floating point number.
    Number,
    /// A boolean.
    Boolean,
    /// The null type, only used in nullable type pairs.
    Null,
}

impl Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        };
        f.write_str(name)
    }
}

impl SchemaType {
    /// The canonical zero value of the type.
    pub fn zero_value(self) -> Value {
        match self {
            SchemaType::Object => Value::Object(Map::new()),
            SchemaType::Array => Value::Array(Vec::new()),
            SchemaType::String => Value::String(String::new()),
            SchemaType::Integer => Value::from(0),
            SchemaType::Number => Value::from(0.0),
            SchemaType::Boolean => Value::Bool(false),
            SchemaType::Null => Value::Null,
        }
    }
}

/// Coerces `value` into `target`.
///
/// `None` and `Some(Value::Null)` are both treated as "no default": the result is
/// `null` when `allow_null` is set, and the zero value of `target` otherwise.
pub fn coerce_default(value: Option<&Value>, target: SchemaType, allow_null: bool) -> Value {
    let value = match value {
        None | Some(Value::Null) if allow_null => return Value::Null,
        None | Some(Value::Null) => return target.zero_value(),
        Some(value) => value,
    };

    let coerced = match target {
        SchemaType::Object => value.is_object().then(|| value.clone()),
        SchemaType::Array => value.is_array().then(|| value.clone()),
        SchemaType::String => to_string(value),
        SchemaType::Integer => to_integer(value),
        SchemaType::Number => to_number(value),
        SchemaType::Boolean => to_boolean(value),
        SchemaType::Null => None,
    };

    coerced.unwrap_or_else(|| target.zero_value())
}

fn to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::String(i.to_string()))
            } else if let Some(u) = n.as_u64() {
                Some(Value::String(u.to_string()))
            } else {
                n.as_f64().map(|f| Value::String(format!("{f:.6}")))
            }
        }
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        // Floats are not truncated.
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Bool(b) => Some(Value::from(i64::from(*b))),
        Value::String(s) => s.parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn to_number(value: &Value) -> Option<Value> {
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }?;
    Number::from_f64(float).map(Value::Number)
}

fn to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Number(n) => {
            let nonzero = match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => i != 0,
                (None, Some(u)) => u != 0,
                _ => n.as_f64().is_some_and(|f| f != 0.0),
            };
            Some(Value::Bool(nonzero))
        }
        Value::String(s) => parse_bool_literal(s)
            .or_else(|| s.parse::<i64>().ok().map(|i| i != 0))
            .map(Value::Bool),
        _ => None,
    }
}

/// Accepts the same literals as the producer's boolean parser.
fn parse_bool_literal(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_TYPES: [SchemaType; 6] = [
        SchemaType::Object,
        SchemaType::Array,
        SchemaType::String,
        SchemaType::Integer,
        SchemaType::Number,
        SchemaType::Boolean,
    ];

    #[test]
    fn test_null_with_allow_null_stays_null() {
        for ty in ALL_TYPES {
            assert_eq!(coerce_default(None, ty, true), Value::Null);
            assert_eq!(coerce_default(Some(&Value::Null), ty, true), Value::Null);
        }
    }

    #[test]
    fn test_null_without_allow_null_is_zero_value() {
        let expected = [json!({}), json!([]), json!(""), json!(0), json!(0.0), json!(false)];
        for (ty, zero) in ALL_TYPES.into_iter().zip(expected) {
            assert_eq!(coerce_default(None, ty, false), zero, "{ty}");
            assert_eq!(coerce_default(Some(&Value::Null), ty, false), zero, "{ty}");
        }
    }

    #[test]
    fn test_structural_types_do_not_cross_coerce() {
        let obj = json!({ "a": 1 });
        let arr = json!([1, 2]);
        assert_eq!(coerce_default(Some(&obj), SchemaType::Object, false), obj);
        assert_eq!(coerce_default(Some(&arr), SchemaType::Array, false), arr);
        assert_eq!(coerce_default(Some(&arr), SchemaType::Object, false), json!({}));
        assert_eq!(coerce_default(Some(&obj), SchemaType::Array, true), json!([]));
        assert_eq!(coerce_default(Some(&json!("x")), SchemaType::Array, false), json!([]));
    }

    #[test]
    fn test_to_string() {
        let ty = SchemaType::String;
        assert_eq!(coerce_default(Some(&json!("abc")), ty, false), json!("abc"));
        assert_eq!(coerce_default(Some(&json!(42)), ty, false), json!("42"));
        assert_eq!(coerce_default(Some(&json!(-3)), ty, false), json!("-3"));
        assert_eq!(coerce_default(Some(&json!(1.5)), ty, false), json!("1.500000"));
        assert_eq!(coerce_default(Some(&json!(true)), ty, false), json!("true"));
        assert_eq!(coerce_default(Some(&json!([1])), ty, false), json!(""));
    }

    #[test]
    fn test_to_integer() {
        let ty = SchemaType::Integer;
        assert_eq!(coerce_default(Some(&json!(5)), ty, false), json!(5));
        assert_eq!(coerce_default(Some(&json!(true)), ty, false), json!(1));
        assert_eq!(coerce_default(Some(&json!(false)), ty, false), json!(0));
        assert_eq!(coerce_default(Some(&json!("7")), ty, false), json!(7));
        assert_eq!(coerce_default(Some(&json!("-12")), ty, false), json!(-12));
        assert_eq!(coerce_default(Some(&json!("seven")), ty, false), json!(0));
        assert_eq!(coerce_default(Some(&json!(2.9)), ty, false), json!(0));
        assert_eq!(coerce_default(Some(&json!({})), ty, false), json!(0));
    }

    #[test]
    fn test_to_number() {
        let ty = SchemaType::Number;
        assert_eq!(coerce_default(Some(&json!(2.5)), ty, false), json!(2.5));
        assert_eq!(coerce_default(Some(&json!(3)), ty, false), json!(3.0));
        assert_eq!(coerce_default(Some(&json!(true)), ty, false), json!(1.0));
        assert_eq!(coerce_default(Some(&json!("0.25")), ty, false), json!(0.25));
        assert_eq!(coerce_default(Some(&json!("abc")), ty, false), json!(0.0));
        assert_eq!(coerce_default(Some(&json!("NaN")), ty, false), json!(0.0));
    }

    #[test]
    fn test_to_boolean() {
        let ty = SchemaType::Boolean;
        assert_eq!(coerce_default(Some(&json!(true)), ty, false), json!(true));
        assert_eq!(coerce_default(Some(&json!(0)), ty, false), json!(false));
        assert_eq!(coerce_default(Some(&json!(3)), ty, false), json!(true));
        assert_eq!(coerce_default(Some(&json!(0.0)), ty, false), json!(false));
        assert_eq!(coerce_default(Some(&json!(0.1)), ty, false), json!(true));
        assert_eq!(coerce_default(Some(&json!("True")), ty, false), json!(true));
        assert_eq!(coerce_default(Some(&json!("f")), ty, false), json!(false));
        assert_eq!(coerce_default(Some(&json!("5")), ty, false), json!(true));
        assert_eq!(coerce_default(Some(&json!("-0")), ty, false), json!(false));
        assert_eq!(coerce_default(Some(&json!("yes")), ty, false), json!(false));
    }

    #[test]
    fn test_zero_value_display() {
        assert_eq!(SchemaType::Integer.to_string(), "integer");
        assert_eq!(SchemaType::Null.zero_value(), Value::Null);
    }
}
