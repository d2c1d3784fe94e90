//! Lenient scalar parsing for settings fields.
//!
//! Interpolated values are always strings, so numeric and boolean fields
//! accept either the native YAML type or its string spelling.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Parse a boolean the way settings overrides spell it.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err("expected a boolean (true/false, 1/0, yes/no, on/off)".to_string()),
    }
}

/// Parse an integer, tolerating surrounding whitespace.
pub fn parse_int<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| format!("expected an integer: {e}"))
}

/// Deserialize a `bool` from a boolean or a string.
pub fn bool_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::String(s) => parse_bool(&s).map_err(D::Error::custom),
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!("expected a boolean, got {n}"))),
        },
        other => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

/// Deserialize an integer from a number or a numeric string.
pub fn int_from_any<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + TryFrom<i64>,
    <T as FromStr>::Err: std::fmt::Display,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| D::Error::custom(format!("integer out of range: {n}"))),
        serde_json::Value::String(s) => parse_int(&s).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected an integer, got {other}"))),
    }
}

/// Deserialize a `String` from any scalar, so `acks: 1` reads as `"1"`.
pub fn string_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a string, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "bool_from_any")]
        flag: bool,
        #[serde(deserialize_with = "int_from_any")]
        port: u16,
    }

    #[test]
    fn test_parse_bool_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "On", " y "] {
            assert_eq!(parse_bool(raw), Ok(true), "{raw}");
        }
        for raw in ["false", "0", "no", "OFF", "f"] {
            assert_eq!(parse_bool(raw), Ok(false), "{raw}");
        }
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int::<u16>(" 5432 "), Ok(5432));
        assert!(parse_int::<u16>("70000").is_err());
        assert!(parse_int::<u32>("three").is_err());
    }

    #[test]
    fn test_native_values() {
        let probe: Probe = serde_json::from_value(json!({"flag": true, "port": 5432})).unwrap();
        assert!(probe.flag);
        assert_eq!(probe.port, 5432);
    }

    #[test]
    fn test_string_values() {
        let probe: Probe = serde_json::from_value(json!({"flag": "no", "port": "6543"})).unwrap();
        assert!(!probe.flag);
        assert_eq!(probe.port, 6543);
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        assert!(serde_json::from_value::<Probe>(json!({"flag": [true], "port": 1})).is_err());
        assert!(serde_json::from_value::<Probe>(json!({"flag": true, "port": -1})).is_err());
        assert!(serde_json::from_value::<Probe>(json!({"flag": true, "port": 1.5})).is_err());
    }
}
