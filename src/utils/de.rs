// src/utils/de.rs

//! Lenient deserializers for provider payloads.
//!
//! Providers are inconsistent about numeric types: counters arrive as
//! numbers, numeric strings, floats or `null`. Everything unusable becomes 0.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an `i64` from a number, a numeric string or `null`.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_i64).unwrap_or(0))
}

/// Deserialize a string from a string, a number or `null`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn value_to_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim().replace([',', ' '], "");
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_i64")]
        n: i64,
        #[serde(default, deserialize_with = "lenient_string")]
        s: String,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_lenient_i64() {
        assert_eq!(probe(r#"{"n": 42}"#).n, 42);
        assert_eq!(probe(r#"{"n": "1,234"}"#).n, 1234);
        assert_eq!(probe(r#"{"n": 12.9}"#).n, 12);
        assert_eq!(probe(r#"{"n": null}"#).n, 0);
        assert_eq!(probe(r#"{"n": "n/a"}"#).n, 0);
        assert_eq!(probe(r#"{}"#).n, 0);
    }

    #[test]
    fn test_lenient_string() {
        assert_eq!(probe(r#"{"s": 7}"#).s, "7");
        assert_eq!(probe(r#"{"s": "x"}"#).s, "x");
        assert_eq!(probe(r#"{"s": null}"#).s, "");
    }
}
