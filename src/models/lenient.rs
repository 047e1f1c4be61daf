//! Field-level lenient decoding for upstream records.
//!
//! The upstream API occasionally omits fields or changes their shape between
//! game modes. A field that is missing or has the wrong JSON type falls back
//! to its `Default` instead of failing the surrounding record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `T`, falling back to `T::default()` on any type mismatch.
///
/// Pair with `#[serde(default)]` so that absent fields are covered too.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a whole record leniently. Non-object values yield the default record.
pub fn record<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(value).unwrap_or_default()
}
