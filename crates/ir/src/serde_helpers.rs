//! Deserialization helpers for the lenient wire format
//!
//! Projects written by the web client use `""` and `null` interchangeably
//! for "unset", and may send `null` for whole sections of a new project.

use serde::{Deserialize, Deserializer};

/// Read `null`, a missing value, or `""` as `None`
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Read `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
