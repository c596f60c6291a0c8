//! Lenient deserializers for loosely-typed backend JSON.
//!
//! The backend is not consistent about ids (numbers vs strings) or numeric
//! values (`72` vs `"72.0"`), so the typed models funnel through these.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON string or number and returns it as a string.
pub(crate) fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    value_to_id(&v).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {v}")))
}

pub(crate) fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_id))
}

/// `true`, `"true"` and `1` are true. Everything else, including `null`, is false.
pub(crate) fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    })
}

pub(crate) fn value_to_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Number or numeric string as `f64`.
pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_f64() {
        assert_eq!(value_to_f64(&json!(72)), Some(72.0));
        assert_eq!(value_to_f64(&json!(" 6.5 ")), Some(6.5));
        assert_eq!(value_to_f64(&json!("n/a")), None);
        assert_eq!(value_to_f64(&json!(null)), None);
    }

    #[test]
    fn test_value_to_id() {
        assert_eq!(value_to_id(&json!(12)), Some("12".into()));
        assert_eq!(value_to_id(&json!("abc")), Some("abc".into()));
        assert_eq!(value_to_id(&json!("")), None);
    }
}
