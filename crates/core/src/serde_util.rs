//! Serde helpers shared by request DTOs.

use serde::{Deserialize, Deserializer};

/// Distinguish an explicit `null` from an absent field.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>` field: absent yields `None`, `null` yields
/// `Some(None)`, a value yields `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
