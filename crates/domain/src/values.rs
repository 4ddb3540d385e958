//! Loosely typed document values.
//!
//! Scenario, configuration and definition documents allow any scalar where a
//! string is expected (`port: 8080`, `enabled: true`). Those values are
//! flattened to strings on load so the rest of the engine only deals with text.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Ordered string-to-string map used for configs, headers, params and rows.
pub type StringMap = IndexMap<String, String>;

/// Renders a document value as the string the engine works with.
///
/// Strings are taken verbatim, `null` becomes `"null"`, every other value is
/// rendered as compact JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Deserializes a map of arbitrary values into a [`StringMap`].
///
/// A missing or `null` map yields an empty map.
///
/// # Errors
///
/// Returns an error if the input is not a map with string keys.
pub fn deserialize_string_map<'de, D>(deserializer: D) -> Result<StringMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| (key.clone(), stringify(value)))
        .collect())
}
