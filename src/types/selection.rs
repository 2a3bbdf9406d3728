use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::value::Value;

/// The user's current choices, keyed by attribute id.
///
/// Evaluation reads the caller's selections and returns a revised copy; the
/// caller's value is never modified. Entries are kept in id order so the
/// serialized form is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Option<Value>>", into = "BTreeMap<String, Value>")]
pub struct Selections {
    values: BTreeMap<String, Value>,
}

impl Selections {
    /// Create an empty selection set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a value for an attribute.
    #[must_use]
    pub fn set(mut self, attribute: &str, value: impl Into<Value>) -> Self {
        self.insert(attribute, value.into());
        self
    }

    /// Select a value for an attribute (mutable reference version).
    pub fn insert(&mut self, attribute: &str, value: Value) {
        self.values.insert(attribute.to_owned(), value);
    }

    /// Remove the selection for an attribute, returning it if present.
    pub fn remove(&mut self, attribute: &str) -> Option<Value> {
        self.values.remove(attribute)
    }

    /// The selected value for an attribute.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(attribute id, value)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse selections from a JSON object. `null` entries count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the input is not an object of scalars.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

impl From<BTreeMap<String, Option<Value>>> for Selections {
    fn from(raw: BTreeMap<String, Option<Value>>) -> Self {
        Self {
            values: raw
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v)))
                .collect(),
        }
    }
}

impl From<Selections> for BTreeMap<String, Value> {
    fn from(selections: Selections) -> Self {
        selections.values
    }
}

impl From<HashMap<String, Value>> for Selections {
    fn from(map: HashMap<String, Value>) -> Self {
        Self {
            values: map.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Selections {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let s = Selections::new().set("color", "Red");
        assert_eq!(s.get("color"), Some(&Value::from("Red")));
        assert!(s.contains("color"));
        assert!(!s.contains("size"));
    }

    #[test]
    fn overwrite_value() {
        let s = Selections::new().set("qty", 10_i64).set("qty", 20_i64);
        assert_eq!(s.get("qty"), Some(&Value::Int(20)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn remove_returns_previous() {
        let mut s = Selections::new().set("size", "Large");
        assert_eq!(s.remove("size"), Some(Value::from("Large")));
        assert_eq!(s.remove("size"), None);
        assert!(s.is_empty());
    }

    #[test]
    fn json_nulls_are_absent() {
        let s = Selections::from_json(r#"{"color": "Red", "size": null, "qty": 100}"#).unwrap();
        assert_eq!(s.len(), 2);
        assert!(!s.contains("size"));
        assert_eq!(s.get("qty"), Some(&Value::Int(100)));
    }

    #[test]
    fn serialized_in_id_order() {
        let s = Selections::new().set("size", "Small").set("color", "Red");
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            r#"{"color":"Red","size":"Small"}"#
        );
    }

    #[test]
    fn from_pairs() {
        let s: Selections = [("color", "Blue"), ("size", "Medium")].into_iter().collect();
        assert_eq!(s.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["color", "size"]);
    }
}
