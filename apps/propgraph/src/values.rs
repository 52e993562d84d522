//! Conversion between command-line text, property values and JSON.
//!
//! Input is read as a JSON literal when it parses as one, so `42` is an
//! integer, `true` a bool, `"42"` a string and `[1, "a"]` a list. Anything
//! that is not valid JSON is taken as a plain string.

use crate::AppError;
use propgraph_core::Value;
use serde_json::Value as Json;

/// Parse a command-line value.
pub fn parse_value(input: &str) -> Result<Value, AppError> {
    match serde_json::from_str::<Json>(input) {
        Ok(json) => from_json(&json).map_err(|reason| AppError::InvalidValue {
            input: input.to_string(),
            reason,
        }),
        Err(_) => Ok(Value::String(input.to_string())),
    }
}

fn from_json(json: &Json) -> Result<Value, String> {
    match json {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| "only 64-bit integers are supported".to_string()),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Json::Null => Err("null is not a property value".to_string()),
        Json::Object(_) => Err("objects are not property values".to_string()),
    }
}

/// Render a property value as plain JSON.
#[must_use]
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => Json::from(*i),
        Value::String(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_literals() {
        assert_eq!(parse_value("42").expect("int"), Value::Integer(42));
        assert_eq!(parse_value("-7").expect("int"), Value::Integer(-7));
        assert_eq!(parse_value("false").expect("bool"), Value::Bool(false));
        assert_eq!(
            parse_value("\"42\"").expect("quoted"),
            Value::String("42".to_string())
        );
        assert_eq!(
            parse_value("[1, \"a\", [true]]").expect("list"),
            Value::List(vec![
                Value::Integer(1),
                Value::from("a"),
                Value::List(vec![Value::Bool(true)]),
            ])
        );
    }

    #[test]
    fn bare_words_are_strings() {
        assert_eq!(parse_value("marko").expect("word"), Value::from("marko"));
        assert_eq!(parse_value("").expect("empty"), Value::from(""));
    }

    #[test]
    fn unsupported_json_is_rejected() {
        for input in ["1.5", "null", "{\"a\": 1}", "[1, null]", "18446744073709551615"] {
            assert!(
                matches!(parse_value(input), Err(AppError::InvalidValue { .. })),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn rendering_mirrors_parsing() {
        let value = Value::List(vec![Value::from("ripple"), Value::Integer(3)]);
        let json = value_to_json(&value);
        assert_eq!(json, serde_json::json!(["ripple", 3]));
        assert_eq!(parse_value(&json.to_string()).expect("reparse"), value);
    }
}
