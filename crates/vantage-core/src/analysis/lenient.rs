//! Tolerant deserializers for model-produced JSON.
//!
//! Models drift from the requested shape: a list comes back as a single
//! string, a number where text was asked for, an object where a list was
//! expected. These helpers coerce what they can and default the rest so a
//! single odd field never discards the whole reply.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Renders a scalar or structure as display text.
pub(crate) fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

pub(crate) fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

/// Deserializes `T`, or its default when the shape does not match.
pub(crate) fn section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Like [`section`] but for optional values; mismatches become `None`.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// A list whose elements are deserialized one by one; bad elements are dropped.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "text")]
        label: String,
        #[serde(default, deserialize_with = "strings")]
        items: Vec<String>,
    }

    #[test]
    fn test_scalars_coerced() {
        let probe: Probe = serde_json::from_value(json!({"label": 42, "items": "one"})).unwrap();
        assert_eq!(probe.label, "42");
        assert_eq!(probe.items, vec!["one"]);
    }

    #[test]
    fn test_mixed_list() {
        let probe: Probe =
            serde_json::from_value(json!({"items": ["a", 2, null, "  ", {"k": "v"}]})).unwrap();
        assert_eq!(probe.items, vec!["a", "2", "{\"k\":\"v\"}"]);
    }

    #[test]
    fn test_array_text_joined() {
        assert_eq!(value_to_text(json!(["a", "b"])), "a; b");
        assert_eq!(value_to_text(Value::Null), "");
    }
}
