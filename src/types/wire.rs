//! Field decoders for the JSON wire shape.
//!
//! Rule stores hand over whatever shape they have. A field the engine cannot
//! interpret decodes as absent so only that fragment loses its effect; the
//! rest of the document still loads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

use super::value::Value;

/// `Some(T)` if the field has a shape `T` understands, `None` otherwise.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Json::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

/// Like [`optional`], falling back to `T::default()`.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    optional(deserializer).map(Option::unwrap_or_default)
}

/// Scalar elements in their string form. Non-scalar elements are dropped;
/// anything but an array is empty.
pub(crate) fn tokens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Json::Array(items) = Json::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Value>(item).ok())
        .map(|value| value.as_text())
        .collect())
}

/// Every element of an array decoded with `decode`, which must not fail so
/// element positions are preserved. Anything but an array is empty.
pub(crate) fn each<T>(raw: Option<Json>, decode: impl Fn(Json) -> T) -> Vec<T> {
    match raw {
        Some(Json::Array(items)) => items.into_iter().map(decode).collect(),
        _ => Vec::new(),
    }
}

/// The id of a store object, preferring `_id` over `id`. Empty ids count as
/// absent.
pub(crate) fn object_id(underscore_id: Option<String>, id: Option<String>) -> Option<String> {
    underscore_id
        .filter(|id| !id.is_empty())
        .or(id.filter(|id| !id.is_empty()))
}
